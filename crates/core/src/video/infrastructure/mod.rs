pub mod image_file_display;
pub mod image_file_reader;
pub mod image_file_writer;
pub mod image_sequence_source;
