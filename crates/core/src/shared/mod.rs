pub mod bbox;
pub mod frame;
pub mod gray;
pub mod timecode;
pub mod video_metadata;
