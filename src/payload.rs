//! Payload de envío
//!
//! Estructura derivada, armada una sola vez al enviar: solicitante (unión
//! etiquetada por tipo), ubicación, el sub-objeto de la dependencia activa
//! y las URL de fotos ya resueltas. Solo se serializa el sub-objeto de la
//! dependencia seleccionada; los campos opcionales vacíos de cada parcela
//! se convierten en `null`.

use crate::error::{InspeccionError, Result};
use crate::form::{
    ApplicantType, ConstructionProcedure, Dependency, District, FormState, ParcelRecord,
};
use crate::sanitize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRequest {
    pub first_name: String,
    pub last_name1: String,
    pub last_name2: Option<String>,
    pub national_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEntityRequest {
    pub legal_name: String,
    pub legal_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub district: District,
    pub exact_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MayorOfficePayload {
    pub procedure_type: String,
    pub observations: Option<String>,
    pub photos: Vec<String>,
}

/// Datos específicos del sub-trámite de Construcciones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstructionData {
    #[serde(rename_all = "camelCase")]
    LandUse {
        requested_use: String,
        property_number: Option<String>,
        cadastral_number: Option<String>,
        observations: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Antiquity {
        property_number: String,
        estimated_age: Option<String>,
        observations: Option<String>,
        photos: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    PcCancellation {
        permit_number: String,
        reason: String,
        photos: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    GeneralInspection {
        details: String,
        photos: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    WorkReceived {
        permit_number: String,
        observations: Option<String>,
        photos: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionsPayload {
    pub procedure: ConstructionProcedure,
    pub data: ConstructionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelPayload {
    pub plan_number: String,
    pub cadastral_number: Option<String>,
    pub area: Option<String>,
    pub parcel_use: Option<String>,
    pub zone_classification: Option<String>,
    pub lessee_name: Option<String>,
    pub lessee_id: Option<String>,
    pub canon_amount: Option<String>,
    pub lease_start: Option<String>,
    pub lease_end: Option<String>,
    pub boundary_north: Option<String>,
    pub boundary_south: Option<String>,
    pub boundary_east: Option<String>,
    pub boundary_west: Option<String>,
    pub frontage: Option<String>,
    pub has_construction: bool,
    pub construction_area: Option<String>,
    pub access_road: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZmtConcessionPayload {
    pub file_number: String,
    pub concession_type: String,
    pub granted_at: String,
    pub expires_at: String,
    pub observations: Option<String>,
    pub photos: Vec<String>,
    pub parcels: Vec<ParcelPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAndServicePayload {
    pub procedure_number: String,
    pub observation: Option<String>,
}

/// Los motivos de falta de firma viajan como `"X"` o `null`, convención
/// del backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPayload {
    pub notifier_signature_url: Option<String>,
    pub nobody_present: Option<String>,
    pub wrong_address: Option<String>,
    pub moved_address: Option<String>,
    pub refused_to_sign: Option<String>,
    pub not_located: Option<String>,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkClosurePayload {
    pub property_number: Option<String>,
    pub cadastral_number: Option<String>,
    pub contract_number: Option<String>,
    pub permit_number: Option<String>,
    pub assessed_area: Option<String>,
    pub built_area: Option<String>,
    pub visit_number: String,
    pub work_receipt: Option<String>,
    pub actions: String,
    pub observations: Option<String>,
    pub photos: Vec<String>,
}

/// Payload completo de creación de una inspección.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub inspection_date: String,
    pub procedure_number: String,
    pub inspector_ids: Vec<String>,
    pub applicant_type: ApplicantType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub individual_request: Option<IndividualRequest>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legal_entity_request: Option<LegalEntityRequest>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<LocationPayload>,
    pub dependency: Dependency,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mayor_office: Option<MayorOfficePayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constructions: Option<ConstructionsPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zmt_concession: Option<ZmtConcessionPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub platform_and_service: Option<PlatformAndServicePayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collection: Option<CollectionPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub work_closure: Option<WorkClosurePayload>,
}

/// URL de fotos resueltas tras la etapa de subida.
#[derive(Debug, Clone, Default)]
pub struct UploadedPhotos {
    /// URL de las fotos de documentación, en el orden de las casillas.
    pub urls: Vec<String>,
    /// URL de la firma del notificado (solo Cobros).
    pub signature_url: Option<String>,
}

/// Texto libre rumbo al payload: sin etiquetas y sin espacios sobrantes.
fn clean_text(value: &str) -> String {
    sanitize::strip_tags(value)
}

fn empty_to_none(value: &str) -> Option<String> {
    let cleaned = clean_text(value);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn flag(value: bool) -> Option<String> {
    if value {
        Some("X".to_string())
    } else {
        None
    }
}

/// Normaliza una parcela a su conjunto de campos declarado.
pub fn normalize_parcel(parcel: &ParcelRecord) -> ParcelPayload {
    ParcelPayload {
        plan_number: clean_text(&parcel.plan_number),
        cadastral_number: empty_to_none(&parcel.cadastral_number),
        area: empty_to_none(&parcel.area),
        parcel_use: empty_to_none(&parcel.parcel_use),
        zone_classification: empty_to_none(&parcel.zone_classification),
        lessee_name: empty_to_none(&parcel.lessee_name),
        lessee_id: empty_to_none(&parcel.lessee_id),
        canon_amount: empty_to_none(&parcel.canon_amount),
        lease_start: empty_to_none(&parcel.lease_start),
        lease_end: empty_to_none(&parcel.lease_end),
        boundary_north: empty_to_none(&parcel.boundary_north),
        boundary_south: empty_to_none(&parcel.boundary_south),
        boundary_east: empty_to_none(&parcel.boundary_east),
        boundary_west: empty_to_none(&parcel.boundary_west),
        frontage: empty_to_none(&parcel.frontage),
        has_construction: parcel.has_construction,
        construction_area: empty_to_none(&parcel.construction_area),
        access_road: empty_to_none(&parcel.access_road),
        observations: empty_to_none(&parcel.observations),
    }
}

/// Arma el payload final desde el estado del formulario y las URL ya
/// subidas. Solo la sección activa aporta datos.
pub fn build_payload(state: &FormState, uploaded: &UploadedPhotos) -> Result<SubmissionPayload> {
    let dependency = state
        .dependency
        .ok_or_else(|| InspeccionError::Incomplete("dependencia sin seleccionar".to_string()))?;

    let (individual_request, legal_entity_request) = match state.applicant_type {
        ApplicantType::Anonymous => (None, None),
        ApplicantType::Individual => (
            Some(IndividualRequest {
                first_name: clean_text(&state.individual.first_name),
                last_name1: clean_text(&state.individual.last_name1),
                last_name2: empty_to_none(&state.individual.last_name2),
                national_id: clean_text(&state.individual.national_id),
            }),
            None,
        ),
        ApplicantType::LegalEntity => (
            None,
            Some(LegalEntityRequest {
                legal_name: clean_text(&state.legal_entity.legal_name),
                legal_id: clean_text(&state.legal_entity.legal_id),
            }),
        ),
    };

    let mut payload = SubmissionPayload {
        inspection_date: state.inspection_date.clone(),
        procedure_number: clean_text(&state.procedure_number),
        inspector_ids: state.inspector_ids.clone(),
        applicant_type: state.applicant_type,
        individual_request,
        legal_entity_request,
        location: Some(LocationPayload {
            district: state.location.district,
            exact_address: clean_text(&state.location.exact_address),
        }),
        dependency,
        mayor_office: None,
        constructions: None,
        zmt_concession: None,
        platform_and_service: None,
        collection: None,
        work_closure: None,
    };

    match dependency {
        Dependency::MayorOffice => {
            payload.mayor_office = Some(MayorOfficePayload {
                procedure_type: clean_text(&state.mayor_office.procedure_type),
                observations: empty_to_none(&state.mayor_office.observations),
                photos: uploaded.urls.clone(),
            });
        }
        Dependency::Constructions => {
            let procedure = state.constructions.procedure.ok_or_else(|| {
                InspeccionError::Incomplete("trámite de construcciones sin seleccionar".to_string())
            })?;
            let data = match procedure {
                ConstructionProcedure::LandUse => ConstructionData::LandUse {
                    requested_use: clean_text(&state.constructions.land_use.requested_use),
                    property_number: empty_to_none(&state.constructions.land_use.property_number),
                    cadastral_number: empty_to_none(
                        &state.constructions.land_use.cadastral_number,
                    ),
                    observations: empty_to_none(&state.constructions.land_use.observations),
                },
                ConstructionProcedure::Antiquity => ConstructionData::Antiquity {
                    property_number: clean_text(&state.constructions.antiquity.property_number),
                    estimated_age: empty_to_none(&state.constructions.antiquity.estimated_age),
                    observations: empty_to_none(&state.constructions.antiquity.observations),
                    photos: uploaded.urls.clone(),
                },
                ConstructionProcedure::PcCancellation => ConstructionData::PcCancellation {
                    permit_number: clean_text(&state.constructions.pc_cancellation.permit_number),
                    reason: clean_text(&state.constructions.pc_cancellation.reason),
                    photos: uploaded.urls.clone(),
                },
                ConstructionProcedure::GeneralInspection => ConstructionData::GeneralInspection {
                    details: clean_text(&state.constructions.general_inspection.details),
                    photos: uploaded.urls.clone(),
                },
                ConstructionProcedure::WorkReceived => ConstructionData::WorkReceived {
                    permit_number: clean_text(&state.constructions.work_received.permit_number),
                    observations: empty_to_none(&state.constructions.work_received.observations),
                    photos: uploaded.urls.clone(),
                },
            };
            payload.constructions = Some(ConstructionsPayload { procedure, data });
        }
        Dependency::ZmtConcession => {
            payload.zmt_concession = Some(ZmtConcessionPayload {
                file_number: clean_text(&state.zmt.file_number),
                concession_type: clean_text(&state.zmt.concession_type),
                granted_at: state.zmt.granted_at.clone(),
                expires_at: state.zmt.expires_at.clone(),
                observations: empty_to_none(&state.zmt.observations),
                photos: uploaded.urls.clone(),
                parcels: state.zmt.parcels.iter().map(normalize_parcel).collect(),
            });
        }
        Dependency::PlatformAndService => {
            payload.platform_and_service = Some(PlatformAndServicePayload {
                procedure_number: clean_text(&state.platform.procedure_number),
                observation: empty_to_none(&state.platform.observation),
            });
        }
        Dependency::Collection => {
            payload.collection = Some(CollectionPayload {
                notifier_signature_url: uploaded.signature_url.clone(),
                nobody_present: flag(state.collection.nobody_present),
                wrong_address: flag(state.collection.wrong_address),
                moved_address: flag(state.collection.moved_address),
                refused_to_sign: flag(state.collection.refused_to_sign),
                not_located: flag(state.collection.not_located),
                other: empty_to_none(&state.collection.other),
            });
        }
        Dependency::WorkClosure => {
            payload.work_closure = Some(WorkClosurePayload {
                property_number: empty_to_none(&state.work_closure.property_number),
                cadastral_number: empty_to_none(&state.work_closure.cadastral_number),
                contract_number: empty_to_none(&state.work_closure.contract_number),
                permit_number: empty_to_none(&state.work_closure.permit_number),
                assessed_area: empty_to_none(&state.work_closure.assessed_area),
                built_area: empty_to_none(&state.work_closure.built_area),
                visit_number: clean_text(&state.work_closure.visit_number),
                work_receipt: empty_to_none(&state.work_closure.work_receipt),
                actions: clean_text(&state.work_closure.actions),
                observations: empty_to_none(&state.work_closure.observations),
                photos: uploaded.urls.clone(),
            });
        }
        Dependency::TaxesAndLicenses | Dependency::RealEstate => {
            return Err(InspeccionError::Incomplete(
                "la dependencia seleccionada no está disponible".to_string(),
            ));
        }
    }

    Ok(payload)
}
