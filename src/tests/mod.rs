pub mod helper;

mod latest;
mod public_url;
