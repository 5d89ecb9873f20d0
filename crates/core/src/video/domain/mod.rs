pub mod frame_sampler;
pub mod image_writer;
pub mod video_reader;
