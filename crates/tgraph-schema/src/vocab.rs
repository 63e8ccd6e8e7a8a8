//! Type and property URIs of the built-in catalog.

pub const SBOL_NS: &str = "http://sbols.org/v2#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
/// Namespace of the `Design` extension type.
pub const SYSBIO_NS: &str = "http://sys-bio.org#";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

pub const COMPONENT_DEFINITION: &str = "http://sbols.org/v2#ComponentDefinition";
pub const SEQUENCE_ANNOTATION: &str = "http://sbols.org/v2#SequenceAnnotation";
pub const SEQUENCE_CONSTRAINT: &str = "http://sbols.org/v2#SequenceConstraint";
pub const COMPONENT: &str = "http://sbols.org/v2#Component";
pub const MODULE_DEFINITION: &str = "http://sbols.org/v2#ModuleDefinition";
pub const FUNCTIONAL_COMPONENT: &str = "http://sbols.org/v2#FunctionalComponent";
pub const SEQUENCE: &str = "http://sbols.org/v2#Sequence";
pub const ATTACHMENT: &str = "http://sbols.org/v2#Attachment";
pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";
pub const DESIGN: &str = "http://sys-bio.org#Design";

// ---------------------------------------------------------------------------
// Identified
// ---------------------------------------------------------------------------

pub const PERSISTENT_IDENTITY: &str = "http://sbols.org/v2#persistentIdentity";
pub const DISPLAY_ID: &str = "http://sbols.org/v2#displayId";
pub const VERSION: &str = "http://sbols.org/v2#version";
pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
pub const TITLE: &str = "http://purl.org/dc/terms/title";
pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

pub const TYPE: &str = "http://sbols.org/v2#type";
pub const ROLE: &str = "http://sbols.org/v2#role";
pub const SEQUENCE_PROPERTY: &str = "http://sbols.org/v2#sequence";
pub const SEQUENCE_ANNOTATION_PROPERTY: &str = "http://sbols.org/v2#sequenceAnnotation";
pub const SEQUENCE_CONSTRAINT_PROPERTY: &str = "http://sbols.org/v2#sequenceConstraint";
pub const COMPONENT_PROPERTY: &str = "http://sbols.org/v2#component";
pub const FUNCTIONAL_COMPONENT_PROPERTY: &str = "http://sbols.org/v2#functionalComponent";
pub const DEFINITION: &str = "http://sbols.org/v2#definition";
pub const ACCESS: &str = "http://sbols.org/v2#access";
pub const DIRECTION: &str = "http://sbols.org/v2#direction";
pub const SUBJECT: &str = "http://sbols.org/v2#subject";
pub const OBJECT: &str = "http://sbols.org/v2#object";
pub const RESTRICTION: &str = "http://sbols.org/v2#restriction";
pub const ELEMENTS: &str = "http://sbols.org/v2#elements";
pub const ENCODING: &str = "http://sbols.org/v2#encoding";
pub const SOURCE: &str = "http://sbols.org/v2#source";
pub const FORMAT: &str = "http://sbols.org/v2#format";
pub const SIZE: &str = "http://sbols.org/v2#size";
pub const HASH: &str = "http://sbols.org/v2#hash";
pub const STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";
pub const ENDED_AT_TIME: &str = "http://www.w3.org/ns/prov#endedAtTime";
pub const STRUCTURE: &str = "http://sys-bio.org#structure";
pub const FUNCTION: &str = "http://sys-bio.org#function";
