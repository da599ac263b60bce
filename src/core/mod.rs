pub mod accessor;

pub mod configuration;

pub mod field;

pub mod mapping;
