//! Stream Reader and Event Parser: from HTTP response bytes to decoded frames.

pub mod http;
pub mod parser;
pub mod reader;

pub use parser::{Frame, FrameParser, MalformedFrame, DONE_SENTINEL};
pub use reader::{decode_chunks, ChunkStream, HttpTransport, PipelineTransport, Utf8Decoder};
