pub mod db;
pub mod service;
pub mod translation;
pub mod message;

#[cfg(test)]
mod tests;
