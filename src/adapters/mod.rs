pub mod dictionary_client;
pub mod sample_forms;
