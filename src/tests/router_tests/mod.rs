mod estimate_tests;
mod export_tests;
mod page_tests;
