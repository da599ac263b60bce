mod common;

use common::{init_logger, name_age_map, people, person, translate, Address, Person, PersonMap};

use csv_export_engine::{
    core::{
        accessor::Hop,
        configuration::WriterConfiguration,
        mapping::{ClassMap, CsvMap},
    },
    item::csv::csv_writer::{CsvWriter, ExportOptions},
    service::ExportService,
    settings::{date_format, ExportSettings, QuoteMode},
};
use rust_decimal::Decimal;

fn writer_for(map: ClassMap<Person>) -> anyhow::Result<CsvWriter<Vec<u8>>> {
    let mut configuration = WriterConfiguration::new();
    configuration.register(map)?;
    Ok(CsvWriter::new(configuration, Vec::new()))
}

fn output(writer: CsvWriter<Vec<u8>>) -> anyhow::Result<String> {
    Ok(String::from_utf8(writer.into_inner()?)?)
}

#[test]
fn header_then_one_line_per_item() -> anyhow::Result<()> {
    init_logger();

    let mut writer = writer_for(name_age_map()?)?;
    let count = writer.write(&[person("Tom Tailor", 15)])?;

    assert_eq!(count, 1);
    assert_eq!(output(writer)?, "Name;Age\nTom Tailor;15\n");
    Ok(())
}

#[test]
fn suppressed_headers_leave_only_rows() -> anyhow::Result<()> {
    let mut map = name_age_map()?;
    map.ignore_headers(true);

    let mut writer = writer_for(map)?;
    writer.write(&[person("Tom Tailor", 15)])?;

    assert_eq!(output(writer)?, "Tom Tailor;15\n");
    Ok(())
}

#[test]
fn requested_columns_narrow_the_output() -> anyhow::Result<()> {
    let mut writer = writer_for(name_age_map()?)?;
    writer.write_columns(&[person("Tom Tailor", 15)], &["Age"], false)?;

    assert_eq!(output(writer)?, "Age\n15\n");
    Ok(())
}

#[test]
fn rounded_decimal_uses_bankers_rounding() -> anyhow::Result<()> {
    let mut map = ClassMap::new();
    map.map("Salary", |p: &Person| p.salary)?.rounded();

    let mut writer = writer_for(map)?;
    writer.write(&people())?;

    assert_eq!(output(writer)?, "Salary\n2\n2\n4\n");
    Ok(())
}

#[test]
fn every_row_has_one_delimiter_less_than_fields() -> anyhow::Result<()> {
    let mut map = ClassMap::new();
    map.map("Name", |p: &Person| p.name.clone())?;
    map.map("Age", |p: &Person| p.age)?;
    map.map("Salary", |p: &Person| p.salary)?;
    map.map("BirthDate", |p: &Person| p.birth_date)?;
    map.map("Nickname", |p: &Person| p.name.clone())?.ignored(true);

    let mut writer = writer_for(map)?;
    writer.write(&people())?;
    let data = output(writer)?;

    assert!(data.ends_with('\n'));
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in lines {
        assert_eq!(line.matches(';').count(), 3, "line: {}", line);
    }
    Ok(())
}

#[test]
fn reconciled_order_matches_the_request() -> anyhow::Result<()> {
    let requests: [&[&str]; 4] = [
        &["Name"],
        &["Age", "Name"],
        &["Salary", "Name", "BirthDate"],
        &["BirthDate", "Salary", "Age", "Name"],
    ];

    for request in requests {
        let mut map = PersonMap::build()?;
        map.validate_columns(request)?;
        map.reconcile(request);

        let ordered: Vec<&str> = map.get_ordered_fields().iter().map(|f| f.name()).collect();
        assert_eq!(ordered, request);
        assert!(map
            .fields()
            .iter()
            .filter(|f| !request.contains(&f.name()))
            .all(|f| f.is_ignored() && f.position() == -1));
    }
    Ok(())
}

#[test]
fn service_renders_translated_headers_and_transforms() -> anyhow::Result<()> {
    init_logger();

    let bytes = ExportService::new().generate::<PersonMap, _>(&people(), translate)?;

    assert_eq!(
        String::from_utf8(bytes)?,
        "Full name;Age;person.salary;Birth date
Tom Tailor;15;2;05/01/2000
Jimmy Bob;22;2;05/01/2000
Foo Test Asp;12;4;05/01/2000
"
    );
    Ok(())
}

#[test]
fn service_options_can_come_from_json() -> anyhow::Result<()> {
    let settings = ExportSettings::from_json(r#"{ "delimiter": ",", "quote_mode": "always" }"#)?;
    let options = ExportOptions::from_json(r#"{ "columns": ["Age", "Name"] }"#)?;

    let bytes = ExportService::with_settings(settings).generate_with::<PersonMap, _>(
        &people()[..2],
        &options,
        translate,
    )?;

    assert_eq!(
        String::from_utf8(bytes)?,
        "\"Age\",\"Full name\"\n\"15\",\"Tom Tailor\"\n\"22\",\"Jimmy Bob\"\n"
    );
    Ok(())
}

#[test]
fn ignored_nested_field_can_be_requested() -> anyhow::Result<()> {
    let options = ExportOptions::columns(["Name", "city"]).ignore_headers(true);

    let bytes = ExportService::new().generate_with::<PersonMap, _>(
        &people()[..2],
        &options,
        translate,
    )?;

    assert_eq!(String::from_utf8(bytes)?, "Tom Tailor;Berlin\nJimmy Bob;Lyon\n");
    Ok(())
}

#[test]
fn header_only_export_respects_columns() -> anyhow::Result<()> {
    let service = ExportService::new();

    let all = service.generate_header_only::<PersonMap, _>(&ExportOptions::new(), translate)?;
    assert_eq!(all, b"Full name;Age;person.salary;Birth date\n");

    let some = service.generate_header_only::<PersonMap, _>(
        &ExportOptions::columns(["BirthDate", "Name"]),
        translate,
    )?;
    assert_eq!(some, b"Birth date;Full name\n");

    let none = service.generate_header_only::<PersonMap, _>(
        &ExportOptions::new().ignore_headers(true),
        translate,
    )?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn validation_is_checked_before_generation() {
    let service = ExportService::new();

    assert!(service.validate::<PersonMap, _>(&["Age", "city"]).is_success());
    assert!(service.validate::<PersonMap, _>(&["Unknown"]).is_failure());
}

#[test]
fn translated_values_fall_back_when_blank() -> anyhow::Result<()> {
    let mut map = ClassMap::new();
    map.map_accessor(
        Hop::new("address", |p: &Person| p.address.as_ref())
            .field("city", |a: &Address| a.city.clone()),
    )?
    .translatable();
    map.map_accessor(
        Hop::new("address", |p: &Person| p.address.as_ref())
            .field("zip", |a: &Address| a.zip.clone()),
    )?;

    let mut configuration = WriterConfiguration::new();
    configuration.register(map)?;
    configuration.set_translation_function(translate);

    let mut writer = CsvWriter::new(configuration, Vec::new());
    writer.write(&people()[..2])?;

    assert_eq!(output(writer)?, "city;zip\nBerlin (DE);10115\nLyon;\n");
    Ok(())
}

#[test]
fn dates_use_preset_formats() -> anyhow::Result<()> {
    let mut map = ClassMap::new();
    map.map("Month", |p: &Person| p.birth_date)?
        .with_date_format(date_format::YEAR_MONTH)?;
    map.map("Default", |p: &Person| p.birth_date)?;

    let mut writer = writer_for(map)?;
    writer.write(&[person("Tom Tailor", 15)])?;

    assert_eq!(output(writer)?, "Month;Default\n01/2000;2000-01-05\n");
    Ok(())
}

#[test]
fn custom_rounding_and_quote_mode() -> anyhow::Result<()> {
    let mut map = ClassMap::new();
    map.map("Name", |p: &Person| p.name.clone())?;
    map.map("Salary", |p: &Person| p.salary)?.rounded();

    let mut configuration = WriterConfiguration::new();
    configuration.register(map)?;
    configuration.set_rounding_function(|value: Decimal| value.round_dp(1));
    configuration.set_quote_mode(QuoteMode::NonNumeric);

    let mut writer = CsvWriter::new(configuration, Vec::new());
    writer.write(&people()[..1])?;

    assert_eq!(output(writer)?, "\"Name\";\"Salary\"\n\"Tom Tailor\";2.3\n");
    Ok(())
}

#[test]
fn groups_and_classes_share_one_sink() -> anyhow::Result<()> {
    struct Team {
        label: String,
    }

    let mut teams = ClassMap::new();
    teams.map("Team", |t: &Team| t.label.clone())?;

    let mut configuration = WriterConfiguration::new();
    configuration.register(name_age_map()?)?;
    configuration.register(teams)?;

    let data = people();
    let mut writer = CsvWriter::new(configuration, Vec::new());
    writer.write(&[Team {
        label: "Blue".to_string(),
    }])?;
    let count = writer.write_groups(data.chunks(2))?;

    assert_eq!(count, 3);
    assert_eq!(
        output(writer)?,
        "Team
Blue
Name;Age
Tom Tailor;15
Jimmy Bob;22
Name;Age
Foo Test Asp;12
"
    );
    Ok(())
}
