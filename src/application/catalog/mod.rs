mod catalog_service;

pub use catalog_service::{
    ServiceDependencies, add_book, add_member, borrow_book, cancel_reservation, get_book,
    list_available_books, list_borrowed_books, remove_book, reserve_book, return_book,
};
