pub mod file_namer;
