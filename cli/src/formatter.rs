use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use deductor::{Derivation, Model, Schema, Source};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// Rows of a deduced model, captioned with its label if it has one
    pub fn format_model(&self, model: &Model, group: &str) -> anyhow::Result<String> {
        let mut output = String::new();
        if let Some(label) = model.label() {
            output.push_str(&label.name);
            if !label.description.is_empty() {
                output.push_str(&format!(": {}", label.description));
            }
            output.push('\n');
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&["Attribute", "Value", "Units", "Description"]));

        for row in model.rows(group)? {
            table.add_row(Row::from(vec![
                Cell::new(&row.name),
                Cell::new(row.value.map_or_else(|| "?".to_string(), format_number))
                    .set_alignment(CellAlignment::Right),
                Cell::new(row.units.as_deref().unwrap_or("")),
                Cell::new(row.description.as_deref().unwrap_or("")),
            ]));
        }

        output.push_str(&table.to_string());
        output.push('\n');
        Ok(output)
    }

    /// Seed values and first derivations in acceptance order
    pub fn format_trace(&self, trace: &[Derivation]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&["Pass", "Attribute", "Value", "Source"]));

        for step in trace {
            let source = match &step.source {
                Source::Seed => "seed".to_string(),
                Source::Rule(rule) => rule.clone(),
            };
            table.add_row(Row::from(vec![
                Cell::new(step.pass).set_alignment(CellAlignment::Right),
                Cell::new(&step.name),
                Cell::new(format_number(step.value)).set_alignment(CellAlignment::Right),
                Cell::new(source),
            ]));
        }

        format!("{}\n", table)
    }

    /// Descriptors, rules and validators of a schema
    ///
    /// With a group, only the attributes of that group are listed.
    pub fn format_schema(&self, schema: &Schema, group: Option<&str>) -> String {
        let mut output = String::new();
        match schema.parent() {
            Some(parent) => {
                output.push_str(&format!("Schema: {} (extends {})\n\n", schema.name(), parent))
            }
            None => output.push_str(&format!("Schema: {}\n\n", schema.name())),
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&["Attribute", "Kind", "Units", "Groups", "Description"]));

        let attributes = schema
            .attributes()
            .iter()
            .filter(|attr| group.is_none_or(|g| attr.has_group(g)));
        for attribute in attributes {
            let summary = attribute.summary();
            let kind = match summary.depends_on.as_slice() {
                [] => summary.kind.to_string(),
                deps => format!("{} of {}", summary.kind, deps.join(", ")),
            };
            table.add_row(Row::from(vec![
                Cell::new(&summary.name),
                Cell::new(kind),
                Cell::new(summary.units.as_deref().unwrap_or("")),
                Cell::new(summary.groups.join(", ")),
                Cell::new(summary.description.as_deref().unwrap_or("")),
            ]));
        }
        output.push_str(&table.to_string());
        output.push('\n');

        if group.is_none() {
            output.push_str(&format!("\nrules ({}):\n", schema.rules().len()));
            for rule in schema.rules() {
                output.push_str(&format!("  - {}\n", rule));
            }
            output.push_str(&format!("\nvalidators ({}):\n", schema.validators().len()));
            for validator in schema.validators() {
                output.push_str(&format!(
                    "  - {} [{}]\n",
                    validator.description(),
                    validator.inputs().join(", ")
                ));
            }
        }
        output
    }

    /// One line per catalog model: `(name, description, schema)`
    pub fn format_catalog(&self, models: &[(&str, &str, &Schema)]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&["Model", "Description", "Attributes", "Rules", "Validators"]));

        for (name, description, schema) in models {
            table.add_row(Row::from(vec![
                Cell::new(name),
                Cell::new(description),
                Cell::new(schema.attributes().len()).set_alignment(CellAlignment::Right),
                Cell::new(schema.rules().len()).set_alignment(CellAlignment::Right),
                Cell::new(schema.validators().len()).set_alignment(CellAlignment::Right),
            ]));
        }

        format!("{}\n", table)
    }
}

fn header(titles: &[&str]) -> Row {
    Row::from(
        titles
            .iter()
            .map(|title| Cell::new(title).set_alignment(CellAlignment::Left))
            .collect::<Vec<_>>(),
    )
}

/// Six significant digits, trailing zeros dropped
///
/// Plain notation between 1e-3 and 1e6, scientific outside.
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    if (-3..6).contains(&magnitude) {
        let decimals = (5 - magnitude).max(0) as usize;
        trim_zeros(format!("{:.*}", decimals, value))
    } else {
        let formatted = format!("{:.5e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                format!("{}e{}", trim_zeros(mantissa.to_string()), exponent)
            }
            None => formatted,
        }
    }
}

fn trim_zeros(number: String) -> String {
    if !number.contains('.') {
        return number;
    }
    number.trim_end_matches('0').trim_end_matches('.').to_string()
}
