pub mod entities;
pub mod fanout;
pub mod mailbox;
pub mod repository;
pub mod service;
pub mod state;
