// Utilities Module
//
// Path handling and source-file exclusion rules shared by the program
// loader, the Vue pre-pass and the generator.

pub mod ignore;
pub mod paths;
