//! Component Audit - Rule/Policy Separation
//!
//! Rules inspect components and produce structured violations.
//! Only errors make a library invalid; warnings still render.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::CompositorConfig;
use crate::library::{ComponentKey, ComponentLibrary, DigitComponent};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditViolation {
    pub rule: String,
    pub component: ComponentKey,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub valid: bool,
    pub loaded: usize,
    pub missing: Vec<ComponentKey>,
    pub violations: Vec<AuditViolation>,
}

impl AuditReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Audit rule trait - produces violations for one component
pub trait ComponentRule {
    fn name(&self) -> &'static str;
    fn check(&self, component: &DigitComponent, config: &CompositorConfig) -> Vec<AuditViolation>;
}

fn alpha_extremes(image: &RgbaImage) -> (bool, bool) {
    let mut any_transparent = false;
    let mut any_visible = false;
    for px in image.pixels() {
        if px.0[3] == 0 {
            any_transparent = true;
        } else {
            any_visible = true;
        }
        if any_transparent && any_visible {
            break;
        }
    }
    (any_transparent, any_visible)
}

// --- Concrete Rules ---

pub struct DimensionsRule;

impl ComponentRule for DimensionsRule {
    fn name(&self) -> &'static str { "dimensions" }

    fn check(&self, component: &DigitComponent, config: &CompositorConfig) -> Vec<AuditViolation> {
        let (w, h) = component.dimensions();
        let (cw, ch) = config.dimensions();
        if (w, h) == (cw, ch) {
            return vec![];
        }
        vec![AuditViolation {
            rule: self.name().to_string(),
            component: component.key,
            severity: ViolationSeverity::Warning,
            message: "Component will be resampled to the canvas size".to_string(),
            expected: Some(format!("{}x{}", cw, ch)),
            actual: Some(format!("{}x{}", w, h)),
            remediation: vec!["Export the component at the canvas size".to_string()],
        }]
    }
}

pub struct AspectRatioRule;

impl ComponentRule for AspectRatioRule {
    fn name(&self) -> &'static str { "aspect_ratio" }

    fn check(&self, component: &DigitComponent, _config: &CompositorConfig) -> Vec<AuditViolation> {
        let (w, h) = component.dimensions();
        if w == h {
            return vec![];
        }
        vec![AuditViolation {
            rule: self.name().to_string(),
            component: component.key,
            severity: ViolationSeverity::Warning,
            message: "Non-square component is distorted when fitted to the canvas".to_string(),
            expected: Some("1:1".to_string()),
            actual: Some(format!("{:.3}", w as f64 / h.max(1) as f64)),
            remediation: vec!["Pad the component to a square canvas".to_string()],
        }]
    }
}

pub struct TransparencyRule;

impl ComponentRule for TransparencyRule {
    fn name(&self) -> &'static str { "transparency" }

    fn check(&self, component: &DigitComponent, _config: &CompositorConfig) -> Vec<AuditViolation> {
        let (any_transparent, _) = alpha_extremes(&component.image);
        if any_transparent {
            return vec![];
        }
        vec![AuditViolation {
            rule: self.name().to_string(),
            component: component.key,
            severity: ViolationSeverity::Error,
            message: "Component has no transparent pixels and hides every other place".to_string(),
            expected: Some("transparent background".to_string()),
            actual: Some("fully opaque".to_string()),
            remediation: vec!["Save the component with an alpha channel and a transparent background".to_string()],
        }]
    }
}

pub struct EmptyComponentRule;

impl ComponentRule for EmptyComponentRule {
    fn name(&self) -> &'static str { "empty" }

    fn check(&self, component: &DigitComponent, _config: &CompositorConfig) -> Vec<AuditViolation> {
        let (_, any_visible) = alpha_extremes(&component.image);
        if any_visible {
            return vec![];
        }
        vec![AuditViolation {
            rule: self.name().to_string(),
            component: component.key,
            severity: ViolationSeverity::Info,
            message: "Component is fully transparent and contributes nothing".to_string(),
            expected: None,
            actual: None,
            remediation: vec!["Check that the strokes were exported".to_string()],
        }]
    }
}

/// Auditor runs every rule over every loaded component
pub struct Auditor {
    rules: Vec<Box<dyn ComponentRule>>,
}

impl Auditor {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(DimensionsRule),
                Box::new(AspectRatioRule),
                Box::new(TransparencyRule),
                Box::new(EmptyComponentRule),
            ],
        }
    }

    pub fn audit(&self, library: &ComponentLibrary, config: &CompositorConfig) -> AuditReport {
        let mut violations = vec![];

        for component in library.components() {
            for rule in &self.rules {
                violations.extend(rule.check(component, config));
            }
        }

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        AuditReport {
            valid,
            loaded: library.len(),
            missing: library.missing(),
            violations,
        }
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new()
    }
}
