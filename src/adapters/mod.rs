//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                |
//! |----------------|--------------------|----------------------------|
//! | `bridge`       | EventSource        | Robot session (TCP)        |
//! |                | ImagingPort        |                            |
//! |                | SpeechPort         |                            |
//! |                | LocomotionPort     |                            |
//! | `config_file`  | ConfigPort         | JSON file                  |
//! | `log_sink`     | EventSink          | `log` facade               |
//! | `png_store`    | FrameStore         | PNG file + viewer process  |

pub mod bridge;
pub mod config_file;
pub mod log_sink;
pub mod png_store;
