use crate::catalog::TransformerChannelDef;

/// The names bound to one channel slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAssignment<'d> {
    pub def: &'d TransformerChannelDef,
    pub names: Vec<String>,
}

/// Binds a flat list of channel names to the slots of one side of an analytic.
///
/// Slots declaring a prefix claim, in slot order, every still-unclaimed name
/// carrying that prefix (the prefix is stripped). The remaining names go to the
/// unprefixed slots positionally: each required slot takes one, then optional
/// slots take one each and the first repeated slot takes everything left, in
/// slot order and only while names remain. The result is in slot order;
/// names nothing accounts for are dropped and a required slot may end up empty.
pub fn assign_channels<'d, S: AsRef<str>>(
    names: &[S],
    defs: &'d [TransformerChannelDef],
) -> Vec<ChannelAssignment<'d>> {
    let mut remaining: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    let mut assigned: Vec<Option<Vec<String>>> = vec![None; defs.len()];

    for (i, def) in defs.iter().enumerate() {
        let Some(prefix) = def.prefix.as_deref() else {
            continue;
        };
        let (matched, rest): (Vec<&str>, Vec<&str>) =
            remaining.into_iter().partition(|n| n.starts_with(prefix));
        assigned[i] = Some(
            matched
                .into_iter()
                .map(|n| n[prefix.len()..].to_string())
                .collect(),
        );
        remaining = rest;
    }

    let unprefixed: Vec<usize> = (0..defs.len()).filter(|&i| assigned[i].is_none()).collect();
    let counts = slot_counts(remaining.len(), unprefixed.iter().map(|&i| &defs[i]));

    let mut cursor = remaining.into_iter();
    for (&i, count) in unprefixed.iter().zip(counts) {
        assigned[i] = Some(cursor.by_ref().take(count).map(str::to_string).collect());
    }

    defs.iter()
        .zip(assigned)
        .map(|(def, names)| ChannelAssignment {
            def,
            names: names.unwrap_or_default(),
        })
        .collect()
}

/// How many names each unprefixed slot consumes, in slot order.
fn slot_counts<'d>(
    available: usize,
    defs: impl Iterator<Item = &'d TransformerChannelDef> + Clone,
) -> Vec<usize> {
    let mut remaining = available;
    let mut counts: Vec<usize> = defs
        .clone()
        .map(|def| {
            if !def.optional && !def.repeated {
                remaining = remaining.saturating_sub(1);
                1
            } else {
                0
            }
        })
        .collect();

    for (count, def) in counts.iter_mut().zip(defs) {
        if remaining == 0 {
            break;
        }
        if def.repeated {
            *count = remaining;
            remaining = 0;
        } else if def.optional {
            *count = 1;
            remaining -= 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_of<'a>(assignments: &'a [ChannelAssignment<'_>]) -> Vec<Vec<&'a str>> {
        assignments
            .iter()
            .map(|a| a.names.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn optional_required_repeated_required() {
        let defs = vec![
            TransformerChannelDef::new("A").optional(),
            TransformerChannelDef::new("B"),
            TransformerChannelDef::new("C").repeated(),
            TransformerChannelDef::new("D"),
        ];
        let names = ["Input", "Input2", "Input3", "Input4", "Input5"];
        let result = assign_channels(&names, &defs);
        assert_eq!(
            names_of(&result),
            vec![
                vec!["Input"],
                vec!["Input2"],
                vec!["Input3", "Input4"],
                vec!["Input5"]
            ]
        );
    }

    #[test]
    fn prefix_slots_claim_their_names_first() {
        let defs = vec![
            TransformerChannelDef::new("Main"),
            TransformerChannelDef::new("Reference").with_prefix("Prefix:").repeated(),
            TransformerChannelDef::new("Other").optional(),
        ];
        let names = ["Prefix:Input", "Input2", "Prefix:Input3", "Input4"];
        let result = assign_channels(&names, &defs);
        assert_eq!(
            names_of(&result),
            vec![vec!["Input2"], vec!["Input", "Input3"], vec!["Input4"]]
        );
    }

    #[test]
    fn optional_slot_is_skipped_when_names_run_out() {
        let defs = vec![
            TransformerChannelDef::new("A").optional(),
            TransformerChannelDef::new("B"),
        ];
        let result = assign_channels(&["only"], &defs);
        assert_eq!(names_of(&result), vec![Vec::<&str>::new(), vec!["only"]]);
    }

    #[test]
    fn missing_names_leave_required_slots_empty() {
        let defs = vec![TransformerChannelDef::new("A"), TransformerChannelDef::new("B")];
        let result = assign_channels(&["x"], &defs);
        assert_eq!(names_of(&result), vec![vec!["x"], Vec::<&str>::new()]);
    }

    #[test]
    fn surplus_names_are_dropped() {
        let defs = vec![TransformerChannelDef::new("A")];
        let result = assign_channels(&["x", "y", "z"], &defs);
        assert_eq!(names_of(&result), vec![vec!["x"]]);
    }

    #[test]
    fn earlier_repeated_slot_starves_later_optional() {
        let defs = vec![
            TransformerChannelDef::new("Many").repeated(),
            TransformerChannelDef::new("Maybe").optional(),
        ];
        let result = assign_channels(&["a", "b", "c"], &defs);
        assert_eq!(names_of(&result), vec![vec!["a", "b", "c"], Vec::<&str>::new()]);
    }

    #[test]
    fn optional_and_repeated_behaves_as_repeated() {
        let defs = vec![
            TransformerChannelDef::new("Both").optional().repeated(),
            TransformerChannelDef::new("Last"),
        ];
        let result = assign_channels(&["a", "b", "c"], &defs);
        assert_eq!(names_of(&result), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn no_defs_yields_nothing() {
        let defs: Vec<TransformerChannelDef> = Vec::new();
        let result = assign_channels(&["a"], &defs);
        assert!(result.is_empty());
    }
}
