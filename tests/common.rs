//! Common test utilities: a representative catalog and helpers to build configs against it.
use analytics_builder::prelude::*;

/// A catalog exercising every kind of property and channel slot:
///
/// - `Threshold`: required decimal, string with valid values, optional float
/// - `Spike`: float with a default, optional string with a pattern validator
/// - `Correlator`: prefixed repeated and optional input slots, bounded integer
/// - `Filter`: repeated string property, optional output slot
/// - `Merger`: inputs `[optional, required, repeated, required]`
/// - `Counter`: a group not listed in `groupOrder`
#[allow(dead_code)]
pub const CATALOG_JSON: &str = r#"{
    "version": "2.1.0.0",
    "groupOrder": ["Detection", "Correlation", "Flow Manipulation"],
    "samples": [
        "\\\\ Name: Sample\n\\\\ Row: 0\ncom.industry.analytics.Analytic(\"Threshold\",[\"Temp\"],[\"Alarm\"],{\"threshold\":\"30.0d\"})\n"
    ],
    "analytics": [
        {
            "name": "Threshold",
            "description": "Emits an event when a value crosses a threshold",
            "group": "Detection",
            "inputChannels": [{"name": "Input"}],
            "outputChannels": [{"name": "Output"}],
            "properties": [
                {"name": "threshold", "description": "Threshold value", "type": "decimal"},
                {
                    "name": "direction",
                    "description": "Crossing direction",
                    "type": "string",
                    "validValues": ["crossing", "rising", "falling"]
                },
                {
                    "name": "hysteresis",
                    "description": "Dead band around the threshold",
                    "type": "float",
                    "optional": true
                }
            ]
        },
        {
            "name": "Spike",
            "description": "Detects sudden jumps",
            "group": "Detection",
            "inputChannels": [{"name": "Input"}],
            "outputChannels": [{"name": "Output"}],
            "properties": [
                {
                    "name": "sensitivity",
                    "description": "Standard deviations",
                    "type": "float",
                    "defaultValue": 1.5
                },
                {
                    "name": "tag",
                    "description": "Label attached to spikes",
                    "type": "string",
                    "optional": true,
                    "validator": {"pattern": "[a-z]+"}
                }
            ]
        },
        {
            "name": "Correlator",
            "description": "Joins a main stream with reference streams",
            "group": "Correlation",
            "inputChannels": [
                {"name": "Main"},
                {"name": "Reference", "prefix": "Ref:", "repeated": true},
                {"name": "Extra", "optional": true}
            ],
            "outputChannels": [{"name": "Output"}],
            "properties": [
                {
                    "name": "window",
                    "description": "Window size in events",
                    "type": "integer",
                    "defaultValue": 10,
                    "validator": {"min": 1, "max": 1000}
                },
                {"name": "strict", "description": "Require every reference", "type": "boolean"}
            ]
        },
        {
            "name": "Filter",
            "description": "Passes events matching every condition",
            "group": "Flow Manipulation",
            "inputChannels": [{"name": "Input"}],
            "outputChannels": [{"name": "Output"}, {"name": "Rejected", "optional": true}],
            "properties": [
                {"name": "field", "description": "Field to compare", "type": "string"},
                {
                    "name": "condition",
                    "description": "Filter condition",
                    "type": "string",
                    "repeated": true
                },
                {
                    "name": "limit",
                    "description": "Maximum number of events passed",
                    "type": "integer",
                    "optional": true,
                    "validator": {"min": 0}
                }
            ]
        },
        {
            "name": "Merger",
            "description": "Merges several streams",
            "group": "Flow Manipulation",
            "inputChannels": [
                {"name": "A", "optional": true},
                {"name": "B"},
                {"name": "C", "repeated": true},
                {"name": "D"}
            ],
            "outputChannels": [{"name": "Output"}]
        },
        {
            "name": "Counter",
            "description": "Counts events",
            "group": "Utilities",
            "inputChannels": [{"name": "Input"}],
            "outputChannels": [{"name": "Count"}],
            "properties": [
                {"name": "reset", "description": "Reset on start", "type": "boolean", "optional": true}
            ]
        }
    ]
}"#;

/// A one-row text configuration against [`CATALOG_JSON`].
#[allow(dead_code)]
pub const SIMPLE_CONFIG_TEXT: &str = r#"\\ Name: Temperature alarms
\\ Description: Raise an alarm above 30 degrees
\\ Version: 2.1.0.0
\\ Row: 0
com.industry.analytics.Analytic("Threshold",["Temp"],["Alarm"],{"threshold":"30.0d","direction":"rising"})
"#;

/// A two-row configuration with internal links, prefixes and repeated properties.
#[allow(dead_code)]
pub const CHAINED_CONFIG_TEXT: &str = r#"\\ Name: Chained
\\ Version: 2.1.0.0
\\ Row: 0
com.industry.analytics.Analytic("Filter",["Raw"],["Row0:Channel1"],{"field":"temperature","condition":["value > 0","value < 100"]})
com.industry.analytics.Analytic("Spike",["Row0:Channel1"],["Spikes"],{"sensitivity":"2.0f","tag":"temp"})
\\ Row: 1
com.industry.analytics.Analytic("Correlator",["Spikes","Ref:Pressure","Ref:Humidity"],["Row1:Channel1"],{"window":"50","strict":"true"})
com.industry.analytics.Analytic("Threshold",["Row1:Channel1"],["Correlated"],{"threshold":"0.5d","direction":"crossing"})
"#;

#[allow(dead_code)]
pub fn catalog() -> Metadata {
    Metadata::from_json(CATALOG_JSON).expect("Failed to load test catalog")
}

#[allow(dead_code)]
pub fn def<'m>(metadata: &'m Metadata, name: &str) -> &'m TransformerDef {
    metadata
        .get_analytic(name)
        .expect("Analytic missing from test catalog")
}

/// A `Threshold` transformer with the given threshold.
#[allow(dead_code)]
pub fn threshold(metadata: &Metadata, value: f64) -> Transformer {
    Transformer::builder(def(metadata, "Threshold"))
        .with_property("threshold", PropertyValue::Decimal(value))
        .build()
        .expect("Failed to build Threshold")
}

/// A `Spike` transformer at its defaults.
#[allow(dead_code)]
pub fn spike(metadata: &Metadata) -> Transformer {
    metadata
        .create_analytic("Spike")
        .expect("Failed to create Spike")
}

/// A named, versioned config holding `rows`.
#[allow(dead_code)]
pub fn config_with_rows(rows: Vec<Row>) -> Config {
    let mut builder = Config::builder()
        .with_name("Test config")
        .with_metadata_version("2.1.0.0");
    for row in rows {
        builder = builder.with_row(row);
    }
    builder.build().expect("Failed to build config")
}

#[allow(dead_code)]
pub fn row_of(transformers: Vec<Transformer>) -> Row {
    let mut builder = Row::builder();
    for transformer in transformers {
        builder = builder.with_transformer(transformer);
    }
    builder.build().expect("Failed to build row")
}
