pub mod ustring;
