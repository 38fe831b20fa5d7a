use serde::Serialize;

/// Input widget a host application should render for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
}

/// One connection-form field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

pub const CONNECTION_FIELDS: &[FieldDef] = &[
    FieldDef {
        key: "host",
        label: "Host/Server/IP Address",
        kind: FieldKind::Text,
        required: true,
        description: None,
    },
    FieldDef {
        key: "port",
        label: "Port (optional)",
        kind: FieldKind::Text,
        required: false,
        description: None,
    },
    FieldDef {
        key: "domain",
        label: "Domain (optional)",
        kind: FieldKind::Text,
        required: false,
        description: Some("Defaults to composite"),
    },
    FieldDef {
        key: "database",
        label: "Datasource",
        kind: FieldKind::Text,
        required: true,
        description: None,
    },
    FieldDef {
        key: "username",
        label: "Database Username",
        kind: FieldKind::Text,
        required: false,
        description: None,
    },
    FieldDef {
        key: "password",
        label: "Database Password",
        kind: FieldKind::Password,
        required: false,
        description: None,
    },
    FieldDef {
        key: "max_rows",
        label: "Maximum rows to return",
        kind: FieldKind::Text,
        required: false,
        description: Some("Optional override of the global row limit"),
    },
];
