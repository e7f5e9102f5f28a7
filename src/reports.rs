use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use itertools::Itertools;
use strum::IntoEnumIterator;
use wordforge::combined::WordlistCombined;
use wordforge::frequency::{FrequencyModel, TokenClass};

pub fn print_build_summary(model: &FrequencyModel, list: &WordlistCombined) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Tokens seen").add_attribute(Attribute::Bold),
        Cell::new(model.token_count()),
    ]);
    table.add_row(vec![
        Cell::new("Tokens accepted").add_attribute(Attribute::Bold),
        Cell::new(model.valid_count()).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Tokens ignored").add_attribute(Attribute::Bold),
        Cell::new(model.ignored_count()),
    ]);
    table.add_row(vec![
        Cell::new("Distinct words").add_attribute(Attribute::Bold),
        Cell::new(model.word_count()).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Exported words").add_attribute(Attribute::Bold),
        Cell::new(list.word_count()).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Bigram rows").add_attribute(Attribute::Bold),
        Cell::new(list.bigram_count()),
    ]);
    table.add_row(vec![
        Cell::new("Invalid words remembered").add_attribute(Attribute::Bold),
        Cell::new(model.invalid_words().len()).fg(Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Non-word boundaries").add_attribute(Attribute::Bold),
        Cell::new(model.not_words().len()),
    ]);
    table.add_row(vec![
        Cell::new("Tokens needing review").add_attribute(Attribute::Bold),
        Cell::new(model.weird_things().len()).fg(Color::Yellow),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);

    let mut classes = Table::new();
    classes
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    classes.add_row(vec![
        Cell::new("Token class").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);
    for class in TokenClass::iter() {
        classes.add_row(vec![
            Cell::new(class.to_string()),
            Cell::new(model.class_count(class)),
        ]);
    }
    if let Some(col) = classes.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", classes);
}

pub fn print_list_report(list: &WordlistCombined, top: usize) {
    match &list.header {
        Some(header) => println!(
            "\n{} {} v{}: {} words, {} bigram rows",
            header.locale,
            header.dict_type,
            header.version,
            list.word_count(),
            list.bigram_count()
        ),
        None => println!(
            "\n(no header): {} words, {} bigram rows",
            list.word_count(),
            list.bigram_count()
        ),
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Word").add_attribute(Attribute::Bold),
        Cell::new("f").fg(Color::Cyan),
        Cell::new("Flags"),
        Cell::new("Next words"),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    for (word, attributes) in list
        .words
        .iter()
        .sorted_by(|a, b| b.1.f.cmp(&a.1.f))
        .take(top)
    {
        let mut flags = Vec::new();
        if attributes.possibly_offensive {
            flags.push("offensive");
        }
        if attributes.not_a_word {
            flags.push("not_a_word");
        }
        let next = attributes
            .bigrams
            .iter()
            .sorted_by_key(|entry| *entry.1)
            .map(|(next_word, _)| next_word.as_str())
            .join(" ");
        table.add_row(vec![
            Cell::new(word).add_attribute(Attribute::Bold),
            Cell::new(attributes.f).fg(Color::Cyan),
            Cell::new(flags.join(" ")).fg(Color::Red),
            Cell::new(next),
        ]);
    }
    println!("\n{}", table);
}
