mod canonical_tests;
mod intern_tests;
mod placeholder_tests;
