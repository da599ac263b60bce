#![allow(dead_code)]

pub mod mocks;

pub use mocks::MockFile;

use csv_export_engine::{
    core::{
        accessor::Hop,
        mapping::{ClassMap, CsvMap},
    },
    ExportResult,
};
use rust_decimal::Decimal;
use time::{macros::date, Date};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct Address {
    pub city: String,
    pub zip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub name: String,
    pub age: u8,
    pub salary: Decimal,
    pub birth_date: Date,
    pub address: Option<Address>,
}

pub fn person(name: &str, age: u8) -> Person {
    Person {
        name: name.to_string(),
        age,
        salary: Decimal::new(2345, 3),
        birth_date: date!(2000 - 01 - 05),
        address: None,
    }
}

pub fn people() -> Vec<Person> {
    vec![
        Person {
            address: Some(Address {
                city: "Berlin".to_string(),
                zip: Some("10115".to_string()),
            }),
            ..person("Tom Tailor", 15)
        },
        Person {
            salary: Decimal::new(25, 1),
            address: Some(Address {
                city: "Lyon".to_string(),
                zip: None,
            }),
            ..person("Jimmy Bob", 22)
        },
        Person {
            salary: Decimal::new(35, 1),
            ..person("Foo Test Asp", 12)
        },
    ]
}

/// `Name` and `Age` only, headers named after the fields.
pub fn name_age_map() -> ExportResult<ClassMap<Person>> {
    let mut map = ClassMap::new();
    map.map("Name", |p: &Person| p.name.clone())?.with_index(0)?;
    map.map("Age", |p: &Person| p.age)?.with_index(1)?;
    Ok(map)
}

pub struct PersonMap;

impl CsvMap for PersonMap {
    type Item = Person;

    fn configure(map: &mut ClassMap<Person>) -> ExportResult<()> {
        map.map("Name", |p: &Person| p.name.clone())?
            .with_header_translation("person.name")?;
        map.map("Age", |p: &Person| p.age)?
            .with_header_translation("person.age")?;
        map.map("Salary", |p: &Person| p.salary)?
            .with_header_translation("person.salary")?
            .rounded();
        map.map("BirthDate", |p: &Person| p.birth_date)?
            .with_header("Birth date")?
            .with_date_format("[day]/[month]/[year]")?;
        map.map_accessor(
            Hop::new("address", |p: &Person| p.address.as_ref())
                .field("city", |a: &Address| a.city.clone()),
        )?
        .ignored(true);
        Ok(())
    }
}

pub fn translate(key: &str) -> String {
    match key {
        "person.name" => "Full name".to_string(),
        "person.age" => "Age".to_string(),
        "Berlin" => "Berlin (DE)".to_string(),
        _ => String::new(),
    }
}
