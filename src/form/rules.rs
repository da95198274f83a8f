//! Esquema declarativo de validación de campos
//!
//! Las reglas por sección son tablas de datos (`FieldRule`): campo → lista
//! de comprobaciones. Una regla solo se aplica cuando su campo pertenece a
//! la sección activa; las reglas cruzadas (firma de Cobros, finca/catastro
//! de Clausura) se evalúan aparte por sección.
//!
//! Política de visibilidad: una violación se muestra al usuario solo si el
//! campo ya fue interactuado (blur) o si el paso marcó su bandera de
//! "mostrar errores" tras un intento fallido de avanzar. Un formulario
//! recién montado no muestra errores.

use crate::form::sections::{self, FieldGroup};
use crate::form::steps::Step;
use crate::form::{ApplicantType, FormState, ParcelRecord};
use crate::photos::{slots, PhotoManager};
use crate::sanitize;
use lazy_static::lazy_static;
use regex::Regex;

pub const MSG_REQUIRED: &str = "Este campo es requerido";
pub const MSG_PROCEDURE_FORMAT: &str =
    "El número de trámite solo admite letras, números y guiones";
pub const MSG_PROCEDURE_TOO_LONG: &str = "El número de trámite supera los 30 caracteres";
pub const MSG_ADDRESS_TOO_LONG: &str = "La dirección supera los 500 caracteres";
pub const MSG_NATIONAL_ID_FORMAT: &str = "Formato de cédula inválido (ej: 5-0123-0456)";
pub const MSG_LEGAL_ID_FORMAT: &str =
    "Formato de cédula jurídica inválido (ej: 3-101-123456)";
pub const MSG_DATE_FORMAT: &str = "Use el formato AAAA-MM-DD";
pub const MSG_DEPENDENCY_UNAVAILABLE: &str = "Esta dependencia aún no está disponible";
pub const MSG_SIGNATURE_OR_REASON: &str =
    "Adjunte la firma del notificado o indique un motivo";
pub const MSG_PROPERTY_OR_CADASTRAL: &str =
    "Indique el número de finca o el número de catastro";

lazy_static! {
    static ref PROCEDURE_NUMBER_RE: Regex =
        Regex::new(r"^[A-Za-z0-9-]+$").expect("regex PROCEDURE_NUMBER_RE");
    static ref NATIONAL_ID_RE: Regex =
        Regex::new(r"^[1-9]-?\d{4}-?\d{4}$").expect("regex NATIONAL_ID_RE");
    static ref LEGAL_ID_RE: Regex = Regex::new(r"^3-?\d{3}-?\d{6}$").expect("regex LEGAL_ID_RE");
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("regex DATE_RE");
}

fn procedure_number_re() -> &'static Regex {
    &PROCEDURE_NUMBER_RE
}
fn national_id_re() -> &'static Regex {
    &NATIONAL_ID_RE
}
fn legal_id_re() -> &'static Regex {
    &LEGAL_ID_RE
}
fn date_re() -> &'static Regex {
    &DATE_RE
}

/// Violación de validación: campo + mensaje para el usuario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: &str, message: &str) -> Self {
        Violation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

type Getter = for<'a> fn(&'a FormState) -> &'a str;

/// Comprobación individual sobre el valor de un campo.
pub enum Check {
    Required,
    /// Solo se evalúa sobre valores no vacíos; el vacío lo cubre `Required`.
    Pattern {
        regex: fn() -> &'static Regex,
        message: &'static str,
    },
    MaxLength {
        limit: usize,
        message: &'static str,
    },
    SafeText,
}

/// Regla declarativa: campo, acceso al valor y comprobaciones en orden.
pub struct FieldRule {
    pub field: &'static str,
    pub getter: Getter,
    pub checks: &'static [Check],
}

static STEP1_RULES: &[FieldRule] = &[
    FieldRule {
        field: "inspectionDate",
        getter: |s| s.inspection_date.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: date_re, message: MSG_DATE_FORMAT },
        ],
    },
    FieldRule {
        field: "procedureNumber",
        getter: |s| s.procedure_number.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: procedure_number_re, message: MSG_PROCEDURE_FORMAT },
            Check::MaxLength { limit: 30, message: MSG_PROCEDURE_TOO_LONG },
            Check::SafeText,
        ],
    },
];

static INDIVIDUAL_RULES: &[FieldRule] = &[
    FieldRule {
        field: "firstName",
        getter: |s| s.individual.first_name.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "lastName1",
        getter: |s| s.individual.last_name1.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "lastName2",
        getter: |s| s.individual.last_name2.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "nationalId",
        getter: |s| s.individual.national_id.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: national_id_re, message: MSG_NATIONAL_ID_FORMAT },
        ],
    },
];

static LEGAL_ENTITY_RULES: &[FieldRule] = &[
    FieldRule {
        field: "legalName",
        getter: |s| s.legal_entity.legal_name.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "legalId",
        getter: |s| s.legal_entity.legal_id.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: legal_id_re, message: MSG_LEGAL_ID_FORMAT },
        ],
    },
];

static STEP2_RULES: &[FieldRule] = &[FieldRule {
    field: "exactAddress",
    getter: |s| s.location.exact_address.as_str(),
    checks: &[
        Check::Required,
        Check::MaxLength { limit: 500, message: MSG_ADDRESS_TOO_LONG },
        Check::SafeText,
    ],
}];

static MAYOR_OFFICE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "mayorOffice.procedureType",
        getter: |s| s.mayor_office.procedure_type.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "mayorOffice.observations",
        getter: |s| s.mayor_office.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

static LAND_USE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "constructions.requestedUse",
        getter: |s| s.constructions.land_use.requested_use.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "constructions.propertyNumber",
        getter: |s| s.constructions.land_use.property_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "constructions.cadastralNumber",
        getter: |s| s.constructions.land_use.cadastral_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "constructions.observations",
        getter: |s| s.constructions.land_use.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

static ANTIQUITY_RULES: &[FieldRule] = &[
    FieldRule {
        field: "constructions.propertyNumber",
        getter: |s| s.constructions.antiquity.property_number.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "constructions.estimatedAge",
        getter: |s| s.constructions.antiquity.estimated_age.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "constructions.observations",
        getter: |s| s.constructions.antiquity.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

static PC_CANCELLATION_RULES: &[FieldRule] = &[
    FieldRule {
        field: "constructions.permitNumber",
        getter: |s| s.constructions.pc_cancellation.permit_number.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "constructions.reason",
        getter: |s| s.constructions.pc_cancellation.reason.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
];

static GENERAL_INSPECTION_RULES: &[FieldRule] = &[FieldRule {
    field: "constructions.details",
    getter: |s| s.constructions.general_inspection.details.as_str(),
    checks: &[Check::Required, Check::SafeText],
}];

static WORK_RECEIVED_RULES: &[FieldRule] = &[
    FieldRule {
        field: "constructions.permitNumber",
        getter: |s| s.constructions.work_received.permit_number.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "constructions.observations",
        getter: |s| s.constructions.work_received.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

static ZMT_RULES: &[FieldRule] = &[
    FieldRule {
        field: "zmtConcession.fileNumber",
        getter: |s| s.zmt.file_number.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "zmtConcession.concessionType",
        getter: |s| s.zmt.concession_type.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "zmtConcession.grantedAt",
        getter: |s| s.zmt.granted_at.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: date_re, message: MSG_DATE_FORMAT },
        ],
    },
    FieldRule {
        field: "zmtConcession.expiresAt",
        getter: |s| s.zmt.expires_at.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: date_re, message: MSG_DATE_FORMAT },
        ],
    },
    FieldRule {
        field: "zmtConcession.observations",
        getter: |s| s.zmt.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

static PLATFORM_RULES: &[FieldRule] = &[
    FieldRule {
        field: "platformAndService.procedureNumber",
        getter: |s| s.platform.procedure_number.as_str(),
        checks: &[
            Check::Required,
            Check::Pattern { regex: procedure_number_re, message: MSG_PROCEDURE_FORMAT },
        ],
    },
    FieldRule {
        field: "platformAndService.observation",
        getter: |s| s.platform.observation.as_str(),
        checks: &[Check::SafeText],
    },
];

static COLLECTION_RULES: &[FieldRule] = &[FieldRule {
    field: "collection.other",
    getter: |s| s.collection.other.as_str(),
    checks: &[Check::SafeText],
}];

static WORK_CLOSURE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "workClosure.propertyNumber",
        getter: |s| s.work_closure.property_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.cadastralNumber",
        getter: |s| s.work_closure.cadastral_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.contractNumber",
        getter: |s| s.work_closure.contract_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.permitNumber",
        getter: |s| s.work_closure.permit_number.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.assessedArea",
        getter: |s| s.work_closure.assessed_area.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.builtArea",
        getter: |s| s.work_closure.built_area.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.visitNumber",
        getter: |s| s.work_closure.visit_number.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "workClosure.workReceipt",
        getter: |s| s.work_closure.work_receipt.as_str(),
        checks: &[Check::SafeText],
    },
    FieldRule {
        field: "workClosure.actions",
        getter: |s| s.work_closure.actions.as_str(),
        checks: &[Check::Required, Check::SafeText],
    },
    FieldRule {
        field: "workClosure.observations",
        getter: |s| s.work_closure.observations.as_str(),
        checks: &[Check::SafeText],
    },
];

/// Campos de texto libre de una parcela; todos pasan el saneamiento.
static PARCEL_TEXT_FIELDS: &[(&str, fn(&ParcelRecord) -> &str)] = &[
    ("planNumber", |p| p.plan_number.as_str()),
    ("cadastralNumber", |p| p.cadastral_number.as_str()),
    ("area", |p| p.area.as_str()),
    ("parcelUse", |p| p.parcel_use.as_str()),
    ("zoneClassification", |p| p.zone_classification.as_str()),
    ("lesseeName", |p| p.lessee_name.as_str()),
    ("lesseeId", |p| p.lessee_id.as_str()),
    ("canonAmount", |p| p.canon_amount.as_str()),
    ("leaseStart", |p| p.lease_start.as_str()),
    ("leaseEnd", |p| p.lease_end.as_str()),
    ("boundaryNorth", |p| p.boundary_north.as_str()),
    ("boundarySouth", |p| p.boundary_south.as_str()),
    ("boundaryEast", |p| p.boundary_east.as_str()),
    ("boundaryWest", |p| p.boundary_west.as_str()),
    ("frontage", |p| p.frontage.as_str()),
    ("constructionArea", |p| p.construction_area.as_str()),
    ("accessRoad", |p| p.access_road.as_str()),
    ("observations", |p| p.observations.as_str()),
];

/// Aplica una tabla de reglas; la primera comprobación fallida de cada
/// campo determina su violación.
fn apply_rules(state: &FormState, rules: &[FieldRule], out: &mut Vec<Violation>) {
    for rule in rules {
        let value = (rule.getter)(state);
        for check in rule.checks {
            let failed = match check {
                Check::Required => value.trim().is_empty(),
                Check::Pattern { regex, .. } => {
                    !value.trim().is_empty() && !regex().is_match(value.trim())
                }
                Check::MaxLength { limit, .. } => value.chars().count() > *limit,
                Check::SafeText => !sanitize::is_safe(value),
            };
            if failed {
                let message = match check {
                    Check::Required => MSG_REQUIRED,
                    Check::Pattern { message, .. } => message,
                    Check::MaxLength { message, .. } => message,
                    Check::SafeText => sanitize::UNSAFE_TEXT_MESSAGE,
                };
                out.push(Violation::new(rule.field, message));
                break;
            }
        }
    }
}

/// Valida el subconjunto de campos del paso indicado. Devuelve todas las
/// violaciones, visibles o no; ver [`visible_violations`].
pub fn validate_step(state: &FormState, photos: &PhotoManager, step: Step) -> Vec<Violation> {
    let mut violations = Vec::new();

    match step {
        Step::Applicant => {
            apply_rules(state, STEP1_RULES, &mut violations);
            if state.inspector_ids.is_empty() {
                violations.push(Violation::new("inspectorIds", MSG_REQUIRED));
            }
            match state.applicant_type {
                ApplicantType::Anonymous => {}
                ApplicantType::Individual => apply_rules(state, INDIVIDUAL_RULES, &mut violations),
                ApplicantType::LegalEntity => {
                    apply_rules(state, LEGAL_ENTITY_RULES, &mut violations)
                }
            }
        }
        Step::Location => {
            apply_rules(state, STEP2_RULES, &mut violations);
        }
        Step::Dependency => match state.dependency {
            None => violations.push(Violation::new("dependency", MSG_REQUIRED)),
            Some(dep) if !dep.is_available() => {
                violations.push(Violation::new("dependency", MSG_DEPENDENCY_UNAVAILABLE))
            }
            Some(_) => {}
        },
        Step::Details => validate_details(state, photos, &mut violations),
    }

    violations
}

/// Paso 4: bloque específico de la dependencia activa. Despacho exhaustivo
/// sobre el grupo de campos resuelto.
fn validate_details(state: &FormState, photos: &PhotoManager, out: &mut Vec<Violation>) {
    let Some(dependency) = state.dependency else {
        out.push(Violation::new("dependency", MSG_REQUIRED));
        return;
    };
    let plan = sections::resolve(dependency, state.constructions.procedure);

    match plan.field_group {
        FieldGroup::MayorOffice => apply_rules(state, MAYOR_OFFICE_RULES, out),
        FieldGroup::Constructions(procedure) => match procedure {
            None => out.push(Violation::new("constructions.procedure", MSG_REQUIRED)),
            Some(p) => {
                use crate::form::ConstructionProcedure::*;
                let rules = match p {
                    LandUse => LAND_USE_RULES,
                    Antiquity => ANTIQUITY_RULES,
                    PcCancellation => PC_CANCELLATION_RULES,
                    GeneralInspection => GENERAL_INSPECTION_RULES,
                    WorkReceived => WORK_RECEIVED_RULES,
                };
                apply_rules(state, rules, out);
            }
        },
        FieldGroup::ZmtConcession => {
            apply_rules(state, ZMT_RULES, out);
            for (index, parcel) in state.zmt.parcels.iter().enumerate() {
                if parcel.plan_number.trim().is_empty() {
                    out.push(Violation::new(
                        &format!("zmtConcession.parcels[{}].planNumber", index),
                        MSG_REQUIRED,
                    ));
                }
                for (name, getter) in PARCEL_TEXT_FIELDS {
                    if !sanitize::is_safe(getter(parcel)) {
                        out.push(Violation::new(
                            &format!("zmtConcession.parcels[{}].{}", index, name),
                            sanitize::UNSAFE_TEXT_MESSAGE,
                        ));
                    }
                }
            }
        }
        FieldGroup::PlatformAndService => apply_rules(state, PLATFORM_RULES, out),
        FieldGroup::Collection => {
            apply_rules(state, COLLECTION_RULES, out);
            // Regla cruzada: firma presente, o algún motivo marcado, o
            // texto en "otro". La violación se adjunta al campo de firma.
            let has_signature = photos.is_populated(slots::SIGNATURE);
            let has_reason =
                state.collection.any_reason() || !state.collection.other.trim().is_empty();
            if !has_signature && !has_reason {
                out.push(Violation::new("collection.firma", MSG_SIGNATURE_OR_REASON));
            }
        }
        FieldGroup::WorkClosure => {
            apply_rules(state, WORK_CLOSURE_RULES, out);
            // Regla cruzada: finca o catastro, al menos uno
            if state.work_closure.property_number.trim().is_empty()
                && state.work_closure.cadastral_number.trim().is_empty()
            {
                out.push(Violation::new(
                    "workClosure.propertyNumber",
                    MSG_PROPERTY_OR_CADASTRAL,
                ));
            }
        }
        FieldGroup::Unavailable => {
            out.push(Violation::new("dependency", MSG_DEPENDENCY_UNAVAILABLE))
        }
    }
}

/// Filtra las violaciones según la política de visibilidad: campo tocado o
/// bandera "mostrar errores" del paso activada.
pub fn visible_violations(
    violations: &[Violation],
    state: &FormState,
    show_errors: bool,
) -> Vec<Violation> {
    violations
        .iter()
        .filter(|v| show_errors || state.is_touched(&v.field))
        .cloned()
        .collect()
}
