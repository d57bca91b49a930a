mod common;

mod inheritance;
mod session;
mod validation;
