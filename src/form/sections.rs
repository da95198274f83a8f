//! Resolución de secciones condicionales
//!
//! Tabla pura: (dependencia, trámite) → grupo de campos activo + casillas
//! de foto requeridas. Cambiar de dependencia o trámite nunca revalida
//! retroactivamente campos que quedaron inactivos.

use crate::form::{ConstructionProcedure, Dependency};
use crate::photos::slots;

/// Grupo de campos activo según los discriminantes seleccionados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    MayorOffice,
    Constructions(Option<ConstructionProcedure>),
    ZmtConcession,
    PlatformAndService,
    Collection,
    WorkClosure,
    /// Dependencia aún no disponible: ningún campo adicional se activa.
    Unavailable,
}

/// Plan de la sección activa.
#[derive(Debug, Clone, Copy)]
pub struct SectionPlan {
    pub field_group: FieldGroup,
    pub required_photo_slots: &'static [&'static str],
}

/// Resuelve el grupo de campos y las fotos requeridas para la selección.
pub fn resolve(
    dependency: Dependency,
    procedure: Option<ConstructionProcedure>,
) -> SectionPlan {
    match dependency {
        Dependency::MayorOffice => SectionPlan {
            field_group: FieldGroup::MayorOffice,
            required_photo_slots: slots::MAYOR_OFFICE,
        },
        Dependency::Constructions => SectionPlan {
            field_group: FieldGroup::Constructions(procedure),
            required_photo_slots: match procedure {
                Some(ConstructionProcedure::Antiquity) => slots::ANTIQUITY,
                Some(ConstructionProcedure::PcCancellation) => slots::PC_CANCELLATION,
                Some(ConstructionProcedure::GeneralInspection) => slots::GENERAL_INSPECTION,
                Some(ConstructionProcedure::WorkReceived) => slots::WORK_RECEIVED,
                // Uso de suelo no exige fotos; sin trámite aún no hay requisitos
                Some(ConstructionProcedure::LandUse) | None => &[],
            },
        },
        Dependency::ZmtConcession => SectionPlan {
            field_group: FieldGroup::ZmtConcession,
            required_photo_slots: slots::ZMT,
        },
        Dependency::PlatformAndService => SectionPlan {
            field_group: FieldGroup::PlatformAndService,
            required_photo_slots: &[],
        },
        Dependency::Collection => SectionPlan {
            // La firma se rige por la regla cruzada, no por el conjunto requerido
            field_group: FieldGroup::Collection,
            required_photo_slots: &[],
        },
        Dependency::WorkClosure => SectionPlan {
            field_group: FieldGroup::WorkClosure,
            required_photo_slots: &[],
        },
        Dependency::TaxesAndLicenses | Dependency::RealEstate => SectionPlan {
            field_group: FieldGroup::Unavailable,
            required_photo_slots: &[],
        },
    }
}

/// Todas las casillas de foto que pertenecen a la sección activa
/// (requeridas u opcionales), en el orden de subida.
pub fn dependency_slots(
    dependency: Dependency,
    procedure: Option<ConstructionProcedure>,
) -> &'static [&'static str] {
    match dependency {
        Dependency::MayorOffice => slots::MAYOR_OFFICE,
        Dependency::Constructions => match procedure {
            Some(ConstructionProcedure::Antiquity) => slots::ANTIQUITY,
            Some(ConstructionProcedure::PcCancellation) => slots::PC_CANCELLATION,
            Some(ConstructionProcedure::GeneralInspection) => slots::GENERAL_INSPECTION,
            Some(ConstructionProcedure::WorkReceived) => slots::WORK_RECEIVED,
            Some(ConstructionProcedure::LandUse) | None => &[],
        },
        Dependency::ZmtConcession => slots::ZMT,
        Dependency::WorkClosure => slots::WORK_CLOSURE,
        Dependency::PlatformAndService
        | Dependency::Collection
        | Dependency::TaxesAndLicenses
        | Dependency::RealEstate => &[],
    }
}
