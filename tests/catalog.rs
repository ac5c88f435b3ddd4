//! Catalog tests
//!
//! Loading analytic definitions from JSON and working with catalog snapshots.
//!
mod common;
use analytics_builder::catalog::RawTransformerDef;
use analytics_builder::prelude::*;
use common::*;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod metadata_tests {
    use super::*;

    #[test]
    fn test_catalog_loads_every_analytic() {
        let metadata = catalog();
        assert_eq!(metadata.version(), "2.1.0.0");
        assert_eq!(metadata.analytics().len(), 6);
        assert_eq!(metadata.samples().len(), 1);
        assert!(metadata.contains("Correlator"));
        assert!(!metadata.contains("correlator"));
    }

    #[test]
    fn test_definitions_carry_slot_and_property_flags() {
        let metadata = catalog();
        let correlator = def(&metadata, "Correlator");
        let reference = correlator
            .input_channel("Reference")
            .expect("Reference slot missing");
        assert!(reference.repeated);
        assert_eq!(reference.prefix.as_deref(), Some("Ref:"));
        assert!(correlator.input_channel("Extra").is_some_and(|c| c.optional));

        let window = correlator.property("window").expect("window missing");
        assert_eq!(window.property_type(), PropertyType::Integer);
        assert_eq!(window.default_value(), Some(&PropertyValue::Integer(10)));
        assert!(window.validator().is_some());

        let direction = def(&metadata, "Threshold")
            .property("direction")
            .expect("direction missing");
        assert_eq!(direction.valid_values().map(<[_]>::len), Some(3));
        assert_eq!(
            direction.initial_value(),
            PropertyValue::String("crossing".into())
        );
    }

    #[test]
    fn test_unknown_analytic_lookup_fails() {
        let metadata = catalog();
        assert_eq!(
            metadata.get_analytic("Nope").unwrap_err(),
            CatalogError::UnknownAnalytic("Nope".into())
        );
        assert!(metadata.create_analytic("Nope").is_err());
    }

    #[test]
    fn test_create_analytic_populates_required_state_only() {
        let metadata = catalog();
        let filter = metadata.create_analytic("Filter").expect("Failed to create Filter");
        let names: Vec<_> = filter
            .properties()
            .iter()
            .map(Property::definition_name)
            .collect();
        assert_eq!(names, vec!["field"]);
        assert_eq!(filter.input_channels().len(), 1);
        assert_eq!(filter.output_channels().len(), 1);

        let correlator = metadata
            .create_analytic("Correlator")
            .expect("Failed to create Correlator");
        let inputs: Vec<_> = correlator.input_channels().iter().map(Channel::name).collect();
        assert_eq!(inputs, vec!["Main", "Reference"]);
    }

    #[test]
    fn test_analytics_are_grouped_in_display_order() {
        let metadata = catalog();
        let groups: Vec<(String, Vec<&str>)> = metadata
            .analytics_by_group()
            .into_iter()
            .map(|(group, defs)| (group, defs.into_iter().map(TransformerDef::name).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("Detection".to_string(), vec!["Spike", "Threshold"]),
                ("Correlation".to_string(), vec!["Correlator"]),
                ("Flow Manipulation".to_string(), vec!["Filter", "Merger"]),
                ("Utilities".to_string(), vec!["Counter"]),
            ]
        );
    }

    #[test]
    fn test_invalid_catalogs_are_rejected() {
        let duplicate = r#"{"analytics": [{"name": "A"}, {"name": "A"}]}"#;
        assert_eq!(
            Metadata::from_json(duplicate).unwrap_err(),
            CatalogError::DuplicateAnalytic("A".into())
        );

        let bad_type = r#"{"analytics": [{"name": "A", "properties": [
            {"name": "p", "description": "P", "type": "color"}
        ]}]}"#;
        assert!(matches!(
            Metadata::from_json(bad_type),
            Err(CatalogError::Definition(DefinitionError::Invalid(_)))
        ));

        let bad_default = r#"{"analytics": [{"name": "A", "properties": [
            {"name": "p", "description": "P", "type": "integer", "defaultValue": "ten"}
        ]}]}"#;
        assert!(matches!(
            Metadata::from_json(bad_default),
            Err(CatalogError::Definition(DefinitionError::TypeMismatch { .. }))
        ));

        let no_description = r#"{"analytics": [{"name": "A", "properties": [
            {"name": "p", "description": "", "type": "string"}
        ]}]}"#;
        assert!(Metadata::from_json(no_description).is_err());

        assert!(matches!(
            Metadata::from_json("{not json"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_with_analytic_leaves_the_original_untouched() {
        let metadata = catalog();
        let extra = RawTransformerDef {
            name: "Delay".into(),
            group: "Utilities".into(),
            ..Default::default()
        };
        let extended = metadata.with_analytic(extra.clone()).expect("Failed to extend");
        assert!(extended.contains("Delay"));
        assert!(!metadata.contains("Delay"));
        assert_eq!(
            extended.with_analytic(extra).unwrap_err(),
            CatalogError::DuplicateAnalytic("Delay".into())
        );
    }
}

#[cfg(test)]
mod active_catalog_tests {
    use super::*;

    #[test]
    fn test_replacing_swaps_snapshots_and_notifies() {
        let mut active = ActiveCatalog::new(catalog());
        let before = active.get();

        let versions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&versions);
        let id = active.subscribe(move |m| sink.borrow_mut().push(m.version().to_string()));

        active
            .load_metadata(r#"{"version": "3.0.0.0", "analytics": []}"#)
            .expect("Failed to load");
        active
            .load_analytic(RawTransformerDef {
                name: "Delay".into(),
                ..Default::default()
            })
            .expect("Failed to load analytic");

        assert_eq!(*versions.borrow(), vec!["3.0.0.0", "3.0.0.0"]);
        assert!(active.get().contains("Delay"));
        assert_eq!(before.version(), "2.1.0.0");
        assert!(before.contains("Threshold"));

        assert!(active.unsubscribe(id));
        active.replace(catalog());
        assert_eq!(versions.borrow().len(), 2);
    }

    #[test]
    fn test_failed_load_keeps_the_current_catalog() {
        let mut active = ActiveCatalog::new(catalog());
        assert!(active.load_metadata("{").is_err());
        assert!(active.get().contains("Threshold"));
    }
}
