mod appointments;
mod blog;
mod catalog;
