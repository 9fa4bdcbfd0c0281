use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// How an actuator interprets a command value.
///
/// Rendered uppercase on the wire (`t1:TORQUE:2.5`). Config files may use
/// either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    /// Target value for a position/velocity controller.
    #[serde(alias = "setpoint")]
    Setpoint,
    /// Direct torque command.
    #[serde(alias = "torque")]
    Torque,
    /// Velocity command.
    #[serde(alias = "velocity")]
    Velocity,
    /// Thruster force command.
    #[serde(alias = "thrust")]
    Thrust,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setpoint => "SETPOINT",
            Self::Torque => "TORQUE",
            Self::Velocity => "VELOCITY",
            Self::Thrust => "THRUST",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActuatorSpec / ObservationSpec
// ---------------------------------------------------------------------------

/// One slot of the ordered action contract.
///
/// The slot order is the implicit contract the simulator-side decoder relies
/// on; once loaded the list is never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorSpec {
    /// Actuator name as the simulator knows it.
    pub name: String,
    /// Command interpretation.
    pub kind: ActionKind,
    /// (low, high) action bounds.
    pub bounds: (f32, f32),
}

impl ActuatorSpec {
    /// Create a spec with the default [-1.0, 1.0] bounds.
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bounds: (-1.0, 1.0),
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, low: f32, high: f32) -> Self {
        self.bounds = (low, high);
        self
    }
}

/// One named slot of the ordered observation contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpec {
    pub name: String,
}

impl ObservationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// TypeTag / FrameValue
// ---------------------------------------------------------------------------

/// Classification tag for a telemetry payload.
///
/// Names match the simulator's tag vocabulary. The `Int` and
/// `VectorInt` tags are part of that vocabulary but are never produced by
/// length-based classification (see `hydrolink-bridge::sniff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Bool,
    Float,
    Int,
    Double,
    VectorFloat,
    VectorInt,
    VectorDouble,
    String,
    VectorString,
    Binary,
}

impl TypeTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Int => "int",
            Self::Double => "double",
            Self::VectorFloat => "vector_float",
            Self::VectorInt => "vector_int",
            Self::VectorDouble => "vector_double",
            Self::String => "string",
            Self::VectorString => "vector_string",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded telemetry payload.
///
/// The wire carries no explicit type tag, so a payload stays a tagged union
/// resolved at decode time; callers must match, never assume.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    Double(f64),
    FloatVec(Vec<f32>),
    IntVec(Vec<i32>),
    DoubleVec(Vec<f64>),
    Text(String),
    TextVec(Vec<String>),
    Binary(Vec<u8>),
}

impl FrameValue {
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Float(_) => TypeTag::Float,
            Self::Int(_) => TypeTag::Int,
            Self::Double(_) => TypeTag::Double,
            Self::FloatVec(_) => TypeTag::VectorFloat,
            Self::IntVec(_) => TypeTag::VectorInt,
            Self::DoubleVec(_) => TypeTag::VectorDouble,
            Self::Text(_) => TypeTag::String,
            Self::TextVec(_) => TypeTag::VectorString,
            Self::Binary(_) => TypeTag::Binary,
        }
    }

    /// Float-vector view, if that is what the payload classified as.
    #[must_use]
    pub fn as_float_vec(&self) -> Option<&[f32]> {
        match self {
            Self::FloatVec(v) => Some(v),
            _ => None,
        }
    }
}

fn fmt_seq<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], precision: Option<usize>) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match precision {
            Some(p) => write!(f, "{item:.p$}")?,
            None => write!(f, "{item}")?,
        }
    }
    f.write_str("]")
}

impl fmt::Display for FrameValue {
    /// One-line diagnostic rendering, e.g. `vector<float>[2]: [1.000, 2.500]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "bool: {v}"),
            Self::Float(v) => write!(f, "float: {v:.6}"),
            Self::Int(v) => write!(f, "int: {v}"),
            Self::Double(v) => write!(f, "double: {v:.10}"),
            Self::FloatVec(v) => {
                write!(f, "vector<float>[{}]: ", v.len())?;
                fmt_seq(f, v, Some(3))
            }
            Self::IntVec(v) => {
                write!(f, "vector<int>[{}]: ", v.len())?;
                fmt_seq(f, v, None)
            }
            Self::DoubleVec(v) => {
                write!(f, "vector<double>[{}]: ", v.len())?;
                fmt_seq(f, v, Some(3))
            }
            Self::Text(v) => write!(f, "string: {v}"),
            Self::TextVec(v) => {
                write!(f, "vector<string>[{}]: ", v.len())?;
                fmt_seq(f, v, None)
            }
            Self::Binary(v) => write!(f, "unknown binary data: {} bytes", v.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// TelemetryFrame
// ---------------------------------------------------------------------------

/// One decoded telemetry message: id, title and typed payload.
///
/// Created per received message and discarded after consumption.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub id: i32,
    pub title: String,
    pub value: FrameValue,
}

impl TelemetryFrame {
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.value.tag()
    }
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {:>2} | {:>20} | {}", self.id, self.title, self.value)
    }
}

// ---------------------------------------------------------------------------
// StateValue
// ---------------------------------------------------------------------------

/// Structured simulator state: entities and attributes are determined at
/// runtime by whatever the simulator sends, so the value is a uniform
/// tagged union keyed by strings rather than a fixed struct.
///
/// JSON `null` converts to [`f64::NAN`] so numeric consumers treat "no
/// value" uniformly with "computed invalid value".
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Number(f64),
    Bool(bool),
    Text(String),
    List(Vec<StateValue>),
    Map(BTreeMap<String, StateValue>),
}

impl StateValue {
    /// Empty structured state.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Convert a parsed JSON value, replacing every `null` (at any depth)
    /// with NaN and leaving all other values structurally unchanged.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Number(f64::NAN),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Look up a key in a map value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(m) => m.get(key),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True if this value, or any nested value, is NaN.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        match self {
            Self::Number(n) => n.is_nan(),
            Self::Bool(_) | Self::Text(_) => false,
            Self::List(items) => items.iter().any(Self::contains_nan),
            Self::Map(entries) => entries.values().any(Self::contains_nan),
        }
    }
}

impl Default for StateValue {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// ResetPose
// ---------------------------------------------------------------------------

/// One entity pose in a RESET command payload.
///
/// Serializes to the exact wire shape:
/// `{"name": ..., "position": [x, y, z], "rotation": [x, y, z]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPose {
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl ResetPose {
    pub fn new(name: impl Into<String>, position: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            rotation,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- ActionKind ----

    #[test]
    fn action_kind_renders_uppercase() {
        assert_eq!(ActionKind::Setpoint.to_string(), "SETPOINT");
        assert_eq!(ActionKind::Torque.to_string(), "TORQUE");
        assert_eq!(ActionKind::Velocity.to_string(), "VELOCITY");
        assert_eq!(ActionKind::Thrust.to_string(), "THRUST");
    }

    #[test]
    fn action_kind_parses_either_case() {
        let upper: ActionKind = serde_json::from_str("\"TORQUE\"").unwrap();
        let lower: ActionKind = serde_json::from_str("\"torque\"").unwrap();
        assert_eq!(upper, ActionKind::Torque);
        assert_eq!(lower, ActionKind::Torque);
    }

    // ---- ActuatorSpec ----

    #[test]
    fn actuator_spec_default_bounds() {
        let spec = ActuatorSpec::new("t1", ActionKind::Torque);
        assert!((spec.bounds.0 - (-1.0)).abs() < f32::EPSILON);
        assert!((spec.bounds.1 - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn actuator_spec_with_bounds() {
        let spec = ActuatorSpec::new("t1", ActionKind::Thrust).with_bounds(-20.0, 20.0);
        assert!((spec.bounds.0 - (-20.0)).abs() < f32::EPSILON);
        assert!((spec.bounds.1 - 20.0).abs() < f32::EPSILON);
    }

    // ---- FrameValue / TypeTag ----

    #[test]
    fn tags_match_wire_vocabulary() {
        assert_eq!(FrameValue::Bool(true).tag().as_str(), "bool");
        assert_eq!(FrameValue::Float(1.5).tag().as_str(), "float");
        assert_eq!(FrameValue::Int(7).tag().as_str(), "int");
        assert_eq!(FrameValue::Double(0.25).tag().as_str(), "double");
        assert_eq!(FrameValue::FloatVec(vec![]).tag().as_str(), "vector_float");
        assert_eq!(FrameValue::IntVec(vec![]).tag().as_str(), "vector_int");
        assert_eq!(
            FrameValue::DoubleVec(vec![]).tag().as_str(),
            "vector_double"
        );
        assert_eq!(FrameValue::Text(String::new()).tag().as_str(), "string");
        assert_eq!(FrameValue::TextVec(vec![]).tag().as_str(), "vector_string");
        assert_eq!(FrameValue::Binary(vec![]).tag().as_str(), "binary");
    }

    #[test]
    fn type_tag_serde_uses_snake_case() {
        let json = serde_json::to_string(&TypeTag::VectorFloat).unwrap();
        assert_eq!(json, "\"vector_float\"");
    }

    #[test]
    fn frame_value_display_scalar() {
        assert_eq!(FrameValue::Float(1.5).to_string(), "float: 1.500000");
        assert_eq!(FrameValue::Bool(true).to_string(), "bool: true");
        assert_eq!(FrameValue::Int(-3).to_string(), "int: -3");
    }

    #[test]
    fn frame_value_display_vectors() {
        assert_eq!(
            FrameValue::FloatVec(vec![1.0, 2.5]).to_string(),
            "vector<float>[2]: [1.000, 2.500]"
        );
        assert_eq!(
            FrameValue::TextVec(vec!["a".into(), "b".into()]).to_string(),
            "vector<string>[2]: [a, b]"
        );
        assert_eq!(
            FrameValue::Binary(vec![0; 5]).to_string(),
            "unknown binary data: 5 bytes"
        );
    }

    #[test]
    fn as_float_vec_only_for_float_vectors() {
        assert!(FrameValue::FloatVec(vec![1.0]).as_float_vec().is_some());
        assert!(FrameValue::DoubleVec(vec![1.0]).as_float_vec().is_none());
        assert!(FrameValue::Float(1.0).as_float_vec().is_none());
    }

    // ---- TelemetryFrame ----

    #[test]
    fn frame_display_line_shape() {
        let frame = TelemetryFrame {
            id: 2,
            title: "depth".into(),
            value: FrameValue::Float(1.5),
        };
        assert_eq!(
            frame.to_string(),
            "ID:  2 |                depth | float: 1.500000"
        );
    }

    // ---- StateValue ----

    #[test]
    fn from_json_replaces_null_with_nan_at_depth() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"girona500": {"depth": 4.2, "dvl": null, "imu": {"yaw": null}}}"#,
        )
        .unwrap();
        let state = StateValue::from_json(json);

        let robot = state.get("girona500").unwrap();
        assert!((robot.get("depth").unwrap().as_number().unwrap() - 4.2).abs() < 1e-9);
        assert!(robot.get("dvl").unwrap().as_number().unwrap().is_nan());
        assert!(robot
            .get("imu")
            .unwrap()
            .get("yaw")
            .unwrap()
            .as_number()
            .unwrap()
            .is_nan());
    }

    #[test]
    fn from_json_replaces_null_inside_lists() {
        let json: serde_json::Value = serde_json::from_str("[1.0, null, 3.0]").unwrap();
        let state = StateValue::from_json(json);
        if let StateValue::List(items) = &state {
            assert!((items[0].as_number().unwrap() - 1.0).abs() < 1e-9);
            assert!(items[1].as_number().unwrap().is_nan());
            assert!((items[2].as_number().unwrap() - 3.0).abs() < 1e-9);
        } else {
            panic!("expected List");
        }
        assert!(state.contains_nan());
    }

    #[test]
    fn from_json_preserves_non_null_values() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"name": "ds", "ok": true, "n": 3}"#).unwrap();
        let state = StateValue::from_json(json);
        assert_eq!(state.get("name"), Some(&StateValue::Text("ds".into())));
        assert_eq!(state.get("ok"), Some(&StateValue::Bool(true)));
        assert!((state.get("n").unwrap().as_number().unwrap() - 3.0).abs() < 1e-9);
        assert!(!state.contains_nan());
    }

    #[test]
    fn empty_state_is_map() {
        assert_eq!(StateValue::default(), StateValue::Map(BTreeMap::new()));
    }

    // ---- ResetPose ----

    #[test]
    fn reset_pose_wire_shape() {
        let pose = ResetPose::new("girona500", [1.0, 2.0, 3.0], [0.0, 0.0, 1.5]);
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(
            json,
            r#"{"name":"girona500","position":[1.0,2.0,3.0],"rotation":[0.0,0.0,1.5]}"#
        );
    }
}
