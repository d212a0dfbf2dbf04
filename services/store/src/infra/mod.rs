pub mod db;
pub mod email;
pub mod password;
pub mod seed;
pub mod storage;
