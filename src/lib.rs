pub mod config;
pub mod domain;
pub mod export;
pub mod google_books;
pub mod import;
pub mod isbn;
pub mod openlibrary;
pub mod services;
