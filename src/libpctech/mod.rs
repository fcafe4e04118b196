pub mod calculator;
pub mod clipboard;
pub mod comments;
pub mod content;
pub mod controls;
pub mod db;
pub mod question;
pub mod quiz;
pub mod search;
pub mod shuffle;
