//! Protocol Module
//!
//! Defines the wire protocol between `postkv-cli` and `postkv-server`.
//!
//! ## Protocol Format (V1 - Framed JSON)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │      JSON Payload           │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE_POST - Payload: {"op":"create_post","title","content"}
//! - 0x02: GET_POST    - Payload: {"op":"get_post","id"}
//! - 0x03: UPDATE_POST - Payload: {"op":"update_post","id","title","content"}
//! - 0x04: DELETE_POST - Payload: {"op":"delete_post","id"}
//! - 0x05: LIST_POSTS  - Payload: {"op":"list_posts","cursor"?,"limit"?}
//! - 0x06: PING        - Payload: {"op":"ping"}
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │      JSON Payload           │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND    (404 equivalent)
//! - 0x02: BAD_REQUEST  (400 equivalent)
//! - 0x03: ERROR        (500 equivalent)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{ErrorBody, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
