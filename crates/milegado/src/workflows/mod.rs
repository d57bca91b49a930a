pub mod testament;
