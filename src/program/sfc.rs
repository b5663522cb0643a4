// Vue single-file component pre-pass
//
// Entry files (and the files they `export * from`) may import `.vue`
// components. The TypeScript `<script>` section of each such component is
// written next to it as `<name>.vue.ts` so module resolution can pick it up.
// The scratch files are owned by `ScratchFiles` and removed when it drops.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static VUE_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)"([^"]*)\.vue";"#).unwrap());

static EXPORT_ALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)export \* from "(.*)";"#).unwrap());

static SCRIPT_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<script(\s+[^>]*)?>").unwrap());

static LANG_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"lang=["']?([^"'\s>]+)"#).unwrap());

const SCRIPT_END: &str = "</script>";

/// Scratch `.vue.ts` files created for one generation run
#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    /// Scan the entries and write a `.vue.ts` companion for every referenced component
    pub fn generate(entries: &[PathBuf]) -> Self {
        let mut scratch = Self::default();
        for entry in entries {
            let Ok(text) = std::fs::read_to_string(entry) else {
                continue;
            };
            let dir = entry.parent().map(Path::to_path_buf).unwrap_or_default();
            scratch.generate_for_text(&text, &dir);

            for caps in EXPORT_ALL_RE.captures_iter(&text) {
                let child = dir.join(format!("{}.ts", &caps[1]));
                let Ok(child_text) = std::fs::read_to_string(&child) else {
                    continue;
                };
                let child_dir = child.parent().map(Path::to_path_buf).unwrap_or_default();
                scratch.generate_for_text(&child_text, &child_dir);
            }
        }
        scratch
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn generate_for_text(&mut self, text: &str, dir: &Path) {
        for caps in VUE_IMPORT_RE.captures_iter(text) {
            let component = dir.join(format!("{}.vue", &caps[1]));
            let Ok(content) = std::fs::read_to_string(&component) else {
                continue;
            };
            let Some(script) = extract_ts_script(&content) else {
                continue;
            };

            let mut target = component.into_os_string();
            target.push(".ts");
            let target = PathBuf::from(target);
            if self.paths.contains(&target) {
                continue;
            }
            match std::fs::write(&target, script) {
                Ok(()) => {
                    debug!("Wrote component script {}", target.display());
                    self.paths.push(target);
                }
                Err(e) => warn!("Failed to write {}: {}", target.display(), e),
            }
        }
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// Text between the first `<script lang="ts">` tag and the last `</script>`
pub fn extract_ts_script(content: &str) -> Option<&str> {
    let start = SCRIPT_START_RE.captures_iter(content).find_map(|caps| {
        let whole = caps.get(0)?;
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let lang = LANG_ATTR_RE.captures(attrs)?.get(1)?;
        (lang.as_str() == "ts").then_some(whole.end())
    })?;
    let end = content.rfind(SCRIPT_END)?;
    (end > start).then(|| &content[start..end])
}
