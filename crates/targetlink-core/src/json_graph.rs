//! JSON 그래프 추상화.
//!
//! 오퍼 참조 탐색은 [`JsonNode`] 위에서 동작한다.
//! - `&serde_json::Value`: 파싱된 응답 (트리)
//! - [`SharedJson`]: `Rc` 기반 그래프. 하위 구조 공유와 순환 참조를 표현할 수 있다.
//!
//! 노드 식별은 주소 기반이다. 구조가 같아도 서로 다른 노드는 서로 다른 식별자를 가진다.

use serde_json::{Number, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// 노드 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// null, bool, number, string
    Scalar,
    /// 배열
    Array,
    /// 객체
    Object,
}

/// 탐색 가능한 JSON 노드
pub trait JsonNode: Sized {
    /// 노드 종류
    fn kind(&self) -> NodeKind;

    /// 복합 노드(배열/객체)의 식별자. 스칼라는 `None`.
    fn identity(&self) -> Option<usize>;

    /// 자식 노드 (배열은 원소 순서, 객체는 필드 순서)
    fn children(&self) -> Vec<Self>;

    /// 객체 필드 조회. 객체가 아니거나 필드가 없으면 `None`.
    fn field(&self, name: &str) -> Option<Self>;

    /// truthy 스칼라를 문자열로 변환. falsy 값과 복합 노드는 `None`.
    fn truthy_text(&self) -> Option<String>;

    /// 후보 필드 목록 중 처음으로 truthy한 값
    fn first_truthy(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find_map(|name| self.field(name).and_then(|v| v.truthy_text()))
    }
}

/// JSON 값의 truthiness
///
/// `null`, `false`, `0`, `""`만 falsy이며 배열/객체는 비어 있어도 truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(_) => Some("true".to_string()),
        _ => None,
    }
}

/// 숫자 표기. 소수부가 없는 실수는 정수로 쓴다 (`1.0` → `"1"`).
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

impl<'a> JsonNode for &'a Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Array(_) => NodeKind::Array,
            Value::Object(_) => NodeKind::Object,
            _ => NodeKind::Scalar,
        }
    }

    fn identity(&self) -> Option<usize> {
        match self.kind() {
            NodeKind::Scalar => None,
            _ => Some(*self as *const Value as usize),
        }
    }

    fn children(&self) -> Vec<Self> {
        let value: &'a Value = *self;
        match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => Vec::new(),
        }
    }

    fn field(&self, name: &str) -> Option<Self> {
        let value: &'a Value = *self;
        value.as_object().and_then(|map| map.get(name))
    }

    fn truthy_text(&self) -> Option<String> {
        scalar_text(self)
    }
}

/// 공유/순환 구조를 허용하는 JSON 그래프 노드
///
/// 복제는 얕은 복제(`Rc` 공유)이다. 순환을 만들면 `Rc` 특성상 해제되지 않는다.
#[derive(Debug, Clone)]
pub enum SharedJson {
    /// 스칼라 값
    Scalar(Value),
    /// 배열
    Array(Rc<RefCell<Vec<SharedJson>>>),
    /// 객체 (필드 삽입 순서 유지)
    Object(Rc<RefCell<Vec<(String, SharedJson)>>>),
}

impl SharedJson {
    /// 빈 객체
    pub fn object() -> Self {
        Self::Object(Rc::new(RefCell::new(Vec::new())))
    }

    /// 빈 배열
    pub fn array() -> Self {
        Self::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// 객체 필드 설정 (같은 키가 있으면 교체). 객체가 아니면 무시.
    pub fn set(&self, key: &str, value: SharedJson) {
        if let Self::Object(fields) = self {
            let mut fields = fields.borrow_mut();
            match fields.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = value,
                None => fields.push((key.to_string(), value)),
            }
        }
    }

    /// 배열 끝에 추가. 배열이 아니면 무시.
    pub fn push(&self, value: SharedJson) {
        if let Self::Array(items) = self {
            items.borrow_mut().push(value);
        }
    }
}

impl From<Value> for SharedJson {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Array(Rc::new(RefCell::new(
                items.into_iter().map(SharedJson::from).collect(),
            ))),
            Value::Object(map) => Self::Object(Rc::new(RefCell::new(
                map.into_iter().map(|(k, v)| (k, SharedJson::from(v))).collect(),
            ))),
            scalar => Self::Scalar(scalar),
        }
    }
}

impl JsonNode for SharedJson {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Array(_) => NodeKind::Array,
            Self::Object(_) => NodeKind::Object,
        }
    }

    fn identity(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
            Self::Object(fields) => Some(Rc::as_ptr(fields) as *const () as usize),
        }
    }

    fn children(&self) -> Vec<Self> {
        match self {
            Self::Scalar(_) => Vec::new(),
            Self::Array(items) => items.borrow().clone(),
            Self::Object(fields) => fields.borrow().iter().map(|(_, v)| v.clone()).collect(),
        }
    }

    fn field(&self, name: &str) -> Option<Self> {
        match self {
            Self::Object(fields) => fields
                .borrow()
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn truthy_text(&self) -> Option<String> {
        match self {
            Self::Scalar(value) => scalar_text(value),
            _ => None,
        }
    }
}
