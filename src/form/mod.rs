//! Estado del formulario de ingreso de inspecciones
//!
//! El formulario guarda los valores de todas las secciones condicionales a
//! la vez; la sección activa la determinan los discriminantes `dependency`
//! y `procedure`. Invariante: los campos de secciones inactivas se ignoran
//! tanto en la validación como en el armado del payload, sin importar el
//! valor almacenado.

pub mod rules;
pub mod sections;
pub mod steps;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Dependencia municipal destino de la inspección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dependency {
    MayorOffice,
    Constructions,
    ZmtConcession,
    PlatformAndService,
    Collection,
    WorkClosure,
    TaxesAndLicenses,
    RealEstate,
}

impl Dependency {
    pub const ALL: &'static [Dependency] = &[
        Dependency::MayorOffice,
        Dependency::Constructions,
        Dependency::ZmtConcession,
        Dependency::PlatformAndService,
        Dependency::Collection,
        Dependency::WorkClosure,
        Dependency::TaxesAndLicenses,
        Dependency::RealEstate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dependency::MayorOffice => "Alcaldía",
            Dependency::Constructions => "Construcciones",
            Dependency::ZmtConcession => "Concesión ZMT",
            Dependency::PlatformAndService => "Plataforma y Servicios",
            Dependency::Collection => "Cobros",
            Dependency::WorkClosure => "Clausura de obra",
            Dependency::TaxesAndLicenses => "Impuestos y licencias",
            Dependency::RealEstate => "Bienes inmuebles",
        }
    }

    /// Dependencias aún no disponibles en el sistema; seleccionarlas
    /// produce siempre una violación de validación sobre el propio campo.
    pub fn is_available(&self) -> bool {
        !matches!(self, Dependency::TaxesAndLicenses | Dependency::RealEstate)
    }
}

/// Sub-trámite dentro de la dependencia Construcciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructionProcedure {
    LandUse,
    Antiquity,
    PcCancellation,
    GeneralInspection,
    WorkReceived,
}

impl ConstructionProcedure {
    pub const ALL: &'static [ConstructionProcedure] = &[
        ConstructionProcedure::LandUse,
        ConstructionProcedure::Antiquity,
        ConstructionProcedure::PcCancellation,
        ConstructionProcedure::GeneralInspection,
        ConstructionProcedure::WorkReceived,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConstructionProcedure::LandUse => "Uso de suelo",
            ConstructionProcedure::Antiquity => "Antigüedad",
            ConstructionProcedure::PcCancellation => "Anulación de PC",
            ConstructionProcedure::GeneralInspection => "Inspección general",
            ConstructionProcedure::WorkReceived => "Recibido de obra",
        }
    }
}

/// Tipo de solicitante (unión etiquetada en el payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicantType {
    #[default]
    Anonymous,
    Individual,
    LegalEntity,
}

impl ApplicantType {
    pub const ALL: &'static [ApplicantType] = &[
        ApplicantType::Anonymous,
        ApplicantType::Individual,
        ApplicantType::LegalEntity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApplicantType::Anonymous => "Anónimo",
            ApplicantType::Individual => "Persona física",
            ApplicantType::LegalEntity => "Persona jurídica",
        }
    }
}

/// Distritos del cantón. El primer valor es el predeterminado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum District {
    #[default]
    Nicoya,
    #[serde(rename = "Mansión")]
    Mansion,
    #[serde(rename = "San Antonio")]
    SanAntonio,
    #[serde(rename = "Quebrada Honda")]
    QuebradaHonda,
    #[serde(rename = "Sámara")]
    Samara,
    Nosara,
    #[serde(rename = "Belén de Nosarita")]
    BelenDeNosarita,
}

impl District {
    pub const ALL: &'static [District] = &[
        District::Nicoya,
        District::Mansion,
        District::SanAntonio,
        District::QuebradaHonda,
        District::Samara,
        District::Nosara,
        District::BelenDeNosarita,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            District::Nicoya => "Nicoya",
            District::Mansion => "Mansión",
            District::SanAntonio => "San Antonio",
            District::QuebradaHonda => "Quebrada Honda",
            District::Samara => "Sámara",
            District::Nosara => "Nosara",
            District::BelenDeNosarita => "Belén de Nosarita",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndividualSection {
    pub first_name: String,
    pub last_name1: String,
    pub last_name2: String,
    pub national_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct LegalEntitySection {
    pub legal_name: String,
    pub legal_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationSection {
    pub district: District,
    pub exact_address: String,
}

#[derive(Debug, Clone, Default)]
pub struct MayorOfficeSection {
    pub procedure_type: String,
    pub observations: String,
}

#[derive(Debug, Clone, Default)]
pub struct LandUseData {
    pub requested_use: String,
    pub property_number: String,
    pub cadastral_number: String,
    pub observations: String,
}

#[derive(Debug, Clone, Default)]
pub struct AntiquityData {
    pub property_number: String,
    pub estimated_age: String,
    pub observations: String,
}

#[derive(Debug, Clone, Default)]
pub struct PcCancellationData {
    pub permit_number: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct GeneralInspectionData {
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct WorkReceivedData {
    pub permit_number: String,
    pub observations: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConstructionsSection {
    pub procedure: Option<ConstructionProcedure>,
    pub land_use: LandUseData,
    pub antiquity: AntiquityData,
    pub pc_cancellation: PcCancellationData,
    pub general_inspection: GeneralInspectionData,
    pub work_received: WorkReceivedData,
}

/// Parcela dentro de una concesión en Zona Marítimo Terrestre.
#[derive(Debug, Clone)]
pub struct ParcelRecord {
    pub id: Uuid,
    pub plan_number: String,
    pub cadastral_number: String,
    pub area: String,
    pub parcel_use: String,
    pub zone_classification: String,
    pub lessee_name: String,
    pub lessee_id: String,
    pub canon_amount: String,
    pub lease_start: String,
    pub lease_end: String,
    pub boundary_north: String,
    pub boundary_south: String,
    pub boundary_east: String,
    pub boundary_west: String,
    pub frontage: String,
    pub has_construction: bool,
    pub construction_area: String,
    pub access_road: String,
    pub observations: String,
}

impl ParcelRecord {
    pub fn new() -> Self {
        ParcelRecord {
            id: Uuid::new_v4(),
            plan_number: String::new(),
            cadastral_number: String::new(),
            area: String::new(),
            parcel_use: String::new(),
            zone_classification: String::new(),
            lessee_name: String::new(),
            lessee_id: String::new(),
            canon_amount: String::new(),
            lease_start: String::new(),
            lease_end: String::new(),
            boundary_north: String::new(),
            boundary_south: String::new(),
            boundary_east: String::new(),
            boundary_west: String::new(),
            frontage: String::new(),
            has_construction: false,
            construction_area: String::new(),
            access_road: String::new(),
            observations: String::new(),
        }
    }
}

impl Default for ParcelRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ZmtSection {
    pub file_number: String,
    pub concession_type: String,
    pub granted_at: String,
    pub expires_at: String,
    pub observations: String,
    pub parcels: Vec<ParcelRecord>,
}

impl Default for ZmtSection {
    fn default() -> Self {
        // La lista de parcelas nunca queda vacía
        ZmtSection {
            file_number: String::new(),
            concession_type: String::new(),
            granted_at: String::new(),
            expires_at: String::new(),
            observations: String::new(),
            parcels: vec![ParcelRecord::new()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlatformSection {
    pub procedure_number: String,
    pub observation: String,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionSection {
    pub nobody_present: bool,
    pub wrong_address: bool,
    pub moved_address: bool,
    pub refused_to_sign: bool,
    pub not_located: bool,
    pub other: String,
}

impl CollectionSection {
    /// `true` si se marcó al menos un motivo de falta de firma.
    pub fn any_reason(&self) -> bool {
        self.nobody_present
            || self.wrong_address
            || self.moved_address
            || self.refused_to_sign
            || self.not_located
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkClosureSection {
    pub property_number: String,
    pub cadastral_number: String,
    pub contract_number: String,
    pub permit_number: String,
    pub assessed_area: String,
    pub built_area: String,
    pub visit_number: String,
    pub work_receipt: String,
    pub actions: String,
    pub observations: String,
}

/// Estado mutable del formulario completo.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub inspection_date: String,
    pub procedure_number: String,
    pub inspector_ids: Vec<String>,
    pub applicant_type: ApplicantType,
    pub individual: IndividualSection,
    pub legal_entity: LegalEntitySection,
    pub location: LocationSection,
    pub dependency: Option<Dependency>,
    pub mayor_office: MayorOfficeSection,
    pub constructions: ConstructionsSection,
    pub zmt: ZmtSection,
    pub platform: PlatformSection,
    pub collection: CollectionSection,
    pub work_closure: WorkClosureSection,
    touched: HashSet<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca un campo como interactuado (equivalente al blur del campo).
    pub fn touch(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Agrega una parcela nueva y devuelve su id generado.
    pub fn add_parcel(&mut self) -> Uuid {
        let parcel = ParcelRecord::new();
        let id = parcel.id;
        self.zmt.parcels.push(parcel);
        id
    }

    /// Elimina la parcela indicada. Siempre queda al menos una: quitar la
    /// última es un no-op y devuelve `false`.
    pub fn remove_parcel(&mut self, id: Uuid) -> bool {
        if self.zmt.parcels.len() <= 1 {
            return false;
        }
        let before = self.zmt.parcels.len();
        self.zmt.parcels.retain(|p| p.id != id);
        self.zmt.parcels.len() < before
    }

    /// Restaura todos los valores a su estado inicial.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = FormState::new();
        assert_eq!(state.applicant_type, ApplicantType::Anonymous);
        assert_eq!(state.location.district, District::Nicoya);
        assert!(state.dependency.is_none());
        assert_eq!(state.zmt.parcels.len(), 1);
        assert!(!state.is_touched("procedureNumber"));
    }

    #[test]
    fn test_touch() {
        let mut state = FormState::new();
        state.touch("exactAddress");
        assert!(state.is_touched("exactAddress"));
        assert!(!state.is_touched("inspectionDate"));
    }

    #[test]
    fn test_parcel_ids_are_unique() {
        let mut state = FormState::new();
        let mut ids = vec![state.zmt.parcels[0].id];
        for _ in 0..10 {
            ids.push(state.add_parcel());
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_remove_parcel_keeps_relative_order() {
        let mut state = FormState::new();
        let first = state.zmt.parcels[0].id;
        let second = state.add_parcel();
        let third = state.add_parcel();

        assert!(state.remove_parcel(second));
        let remaining: Vec<_> = state.zmt.parcels.iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![first, third]);
    }

    #[test]
    fn test_last_parcel_cannot_be_removed() {
        let mut state = FormState::new();
        let only = state.zmt.parcels[0].id;
        assert!(!state.remove_parcel(only));
        assert_eq!(state.zmt.parcels.len(), 1);
    }

    #[test]
    fn test_remove_unknown_parcel_is_noop() {
        let mut state = FormState::new();
        state.add_parcel();
        assert!(!state.remove_parcel(Uuid::new_v4()));
        assert_eq!(state.zmt.parcels.len(), 2);
    }

    #[test]
    fn test_dependency_serializes_camel_case() {
        let json = serde_json::to_string(&Dependency::ZmtConcession).unwrap();
        assert_eq!(json, "\"zmtConcession\"");
        let json = serde_json::to_string(&Dependency::MayorOffice).unwrap();
        assert_eq!(json, "\"mayorOffice\"");
    }

    #[test]
    fn test_unavailable_dependencies() {
        assert!(!Dependency::TaxesAndLicenses.is_available());
        assert!(!Dependency::RealEstate.is_available());
        assert!(Dependency::Constructions.is_available());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = FormState::new();
        state.procedure_number = "ABC-123".to_string();
        state.applicant_type = ApplicantType::Individual;
        state.add_parcel();
        state.touch("procedureNumber");

        state.reset();
        assert_eq!(state.procedure_number, "");
        assert_eq!(state.applicant_type, ApplicantType::Anonymous);
        assert_eq!(state.zmt.parcels.len(), 1);
        assert!(!state.is_touched("procedureNumber"));
    }
}
