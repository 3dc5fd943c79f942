pub mod db;
pub mod security;
pub mod test_utils;
pub mod upload;
pub mod utils;
