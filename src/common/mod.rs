pub mod table_reader;
pub mod types;
pub mod validator;
