use super::CodecOptions;
use super::grammar::{COMMENT_PREFIX, quote};
use super::properties::render_block;
use crate::catalog::{Metadata, TransformerChannelDef, TransformerDef};
use crate::error::SerializeError;
use crate::model::{Config, Row, Transformer};
use itertools::Itertools;

/// Writes `config` in the text format.
pub(crate) fn serialize(
    config: &Config,
    metadata: &Metadata,
    options: &CodecOptions,
) -> Result<String, SerializeError> {
    let mut out = String::new();
    if let Some(name) = config.name() {
        marker(&mut out, "Name", name)?;
    }
    if config.has_description() {
        marker(&mut out, "Description", config.description())?;
    }
    marker(
        &mut out,
        "Version",
        config.metadata_version().unwrap_or(options.default_version.as_str()),
    )?;

    for (row_index, row) in config.rows().iter().enumerate() {
        marker(&mut out, "Row", &row_index.to_string())?;
        for line in row_lines(row_index, row, metadata, options)? {
            out.push_str(&line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// A marker holds its whole value on one line.
fn marker(out: &mut String, key: &str, value: &str) -> Result<(), SerializeError> {
    if value.contains(['\n', '\r']) {
        return Err(SerializeError::MultilineMarker {
            key: key.to_string(),
        });
    }
    out.push_str(&format!("{} {}: {}\n", COMMENT_PREFIX, key, value));
    Ok(())
}

fn row_lines(
    row_index: usize,
    row: &Row,
    metadata: &Metadata,
    options: &CodecOptions,
) -> Result<Vec<String>, SerializeError> {
    let transformers = row.transformers();
    let Some(last) = transformers.len().checked_sub(1) else {
        return Ok(Vec::new());
    };

    // Link k joins transformer k to k + 1; its synthesized names are numbered
    // from links[k] + 1 within the row.
    let mut links = Vec::with_capacity(last);
    let mut base = 0;
    for (left, right) in transformers.iter().tuple_windows() {
        links.push(base);
        base += left.output_channels().len().max(right.input_channels().len());
    }

    let effective_inputs = row.effective_input_channels();
    let effective_outputs = row.effective_output_channels();

    transformers
        .iter()
        .enumerate()
        .map(|(position, transformer)| {
            if transformer.name().is_empty() {
                return Err(SerializeError::UnnamedTransformer {
                    row: row_index,
                    position,
                });
            }
            let def = metadata.get_analytic(transformer.name())?;

            let inputs: Vec<String> = if position == 0 {
                effective_inputs.iter().map(|c| c.name().to_string()).collect()
            } else {
                link_names(row_index, links[position - 1], transformer.input_channels().len())
            };
            let outputs: Vec<String> = if position == last {
                effective_outputs.iter().map(|c| c.name().to_string()).collect()
            } else {
                link_names(row_index, links[position], transformer.output_channels().len())
            };

            let inputs = prefixed(inputs, |i| transformer.input_slot(def, i));
            let outputs = prefixed(outputs, |i| transformer.output_slot(def, i));
            Ok(analytic_line(&options.namespace, transformer, def, &inputs, &outputs))
        })
        .collect()
}

fn link_names(row_index: usize, base: usize, count: usize) -> Vec<String> {
    (1..=count)
        .map(|k| format!("Row{}:Channel{}", row_index, base + k))
        .collect()
}

/// Re-applies each slot's declared prefix so the name binds to the same slot
/// when read back.
fn prefixed<'d>(
    names: Vec<String>,
    slot: impl Fn(usize) -> Option<&'d TransformerChannelDef>,
) -> Vec<String> {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| match slot(i) {
            Some(def) => def.apply_prefix(&name),
            None => name,
        })
        .collect()
}

fn analytic_line(
    namespace: &str,
    transformer: &Transformer,
    def: &TransformerDef,
    inputs: &[String],
    outputs: &[String],
) -> String {
    format!(
        "{}.Analytic({},[{}],[{}],{})",
        namespace,
        quote(transformer.name()),
        channel_list(inputs),
        channel_list(outputs),
        render_block(transformer, def)
    )
}

/// An empty list is written as `""`: the grammar wants at least one element.
fn channel_list(names: &[String]) -> String {
    if names.is_empty() {
        return quote("");
    }
    names.iter().map(|n| quote(n)).join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_just_the_version() {
        let text = serialize(&Config::new(), &Metadata::default(), &CodecOptions::default()).unwrap();
        assert_eq!(text, "\\\\ Version: 0.0.0.0\n");
    }

    #[test]
    fn marker_values_must_fit_on_one_line() {
        let mut out = String::new();
        marker(&mut out, "Name", "Plain").unwrap();
        assert_eq!(out, "\\\\ Name: Plain\n");
        assert_eq!(
            marker(&mut out, "Description", "carriage\rreturn"),
            Err(SerializeError::MultilineMarker {
                key: "Description".into()
            })
        );
    }

    #[test]
    fn link_names_count_from_the_link_base() {
        assert_eq!(link_names(0, 0, 1), vec!["Row0:Channel1"]);
        assert_eq!(link_names(2, 3, 2), vec!["Row2:Channel4", "Row2:Channel5"]);
    }

    #[test]
    fn empty_channel_list_is_one_empty_string() {
        assert_eq!(channel_list(&[]), "\"\"");
        assert_eq!(
            channel_list(&["a".to_string(), "b".to_string()]),
            "\"a\",\"b\""
        );
    }
}
