//! Asistente interactivo de 4 pasos
//!
//! Une el navegador, el esquema de validación, el gestor de fotos y el
//! orquestador de envío detrás de prompts de terminal. La interfaz nunca
//! usa diálogos bloqueantes para errores de campo: las violaciones se
//! listan en línea y el paso se repite.

use crate::api::HttpApi;
use crate::config::Config;
use crate::error::{InspeccionError, Result};
use crate::form::sections;
use crate::form::steps::{NavOutcome, Step};
use crate::form::{ApplicantType, ConstructionProcedure, Dependency, District, FormState};
use crate::photos::{slots, AttachOutcome, PhotoFile};
use crate::submit::IntakeForm;
use crate::uploader::{AssetUploader, CloudinaryUploader};
use async_trait::async_trait;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

fn prompt_err(e: dialoguer::Error) -> InspeccionError {
    InspeccionError::Prompt(e.to_string())
}

fn ask(prompt: &str, allow_empty: bool) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(prompt_err)?;
    // las etiquetas se eliminan al aceptar el valor, no al enviarlo
    Ok(crate::sanitize::strip_tags(&value))
}

fn choose(prompt: &str, items: &[&str]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_err)
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(prompt_err)
}

/// Decora un uploader real con una barra de progreso por foto.
struct ProgressUploader<'a> {
    inner: &'a dyn AssetUploader,
    bar: &'a ProgressBar,
}

#[async_trait]
impl AssetUploader for ProgressUploader<'_> {
    async fn upload(&self, file: &PhotoFile) -> Result<String> {
        let result = self.inner.upload(file).await;
        self.bar.inc(1);
        result
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let token = config.get_token()?;
    let mut form = IntakeForm::new();

    println!("📋 inspecciones - nueva inspección\n");

    loop {
        let step = form.navigator.current();
        println!("[{}/4] {}", step.number(), step.title());

        match step {
            Step::Applicant => prompt_applicant(&mut form.state)?,
            Step::Location => prompt_location(&mut form.state)?,
            Step::Dependency => prompt_dependency(&mut form.state)?,
            Step::Details => prompt_details(&mut form)?,
        }

        match form.navigator.next(&form.state, &mut form.photos) {
            NavOutcome::Advanced(_) => println!(),
            NavOutcome::ReadyToSubmit => break,
            NavOutcome::Blocked {
                violations,
                first_missing_slot,
            } => {
                println!("✖ Corrija antes de continuar:");
                for v in &violations {
                    println!("  - {}: {}", v.field, v.message);
                }
                if let Some(slot) = first_missing_slot {
                    println!("  → revise la foto '{}'", slot);
                }
                println!();
            }
            NavOutcome::Busy => {}
        }
    }

    if !confirm("¿Enviar la inspección?", true)? {
        println!("Envío cancelado; los datos se descartan.");
        return Ok(());
    }

    let uploader = CloudinaryUploader::new(&config.base_url, &token, config.timeout_seconds)?;
    let api = HttpApi::new(&config.base_url, &token, config.timeout_seconds)?;

    let pending = pending_photo_count(&form);
    let bar = ProgressBar::new(pending);
    bar.set_style(
        ProgressStyle::with_template("{spinner} subiendo fotos {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress = ProgressUploader {
        inner: &uploader,
        bar: &bar,
    };

    match form.submit(&progress, &api).await {
        Ok(created) => {
            bar.finish_and_clear();
            println!("\n✅ Inspección creada (id: {})", created.id);
            Ok(())
        }
        Err(err) => {
            bar.finish_and_clear();
            // el estado queda intacto; el reintento es manual
            Err(err)
        }
    }
}

fn pending_photo_count(form: &IntakeForm) -> u64 {
    let Some(dependency) = form.state.dependency else {
        return 0;
    };
    let mut count = sections::dependency_slots(dependency, form.state.constructions.procedure)
        .iter()
        .filter(|&&key| form.photos.is_populated(key))
        .count() as u64;
    if dependency == Dependency::Collection && form.photos.is_populated(slots::SIGNATURE) {
        count += 1;
    }
    count
}

fn prompt_applicant(state: &mut FormState) -> Result<()> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let date = ask(&format!("Fecha de inspección [{}]", today), true)?;
    state.inspection_date = if date.is_empty() { today } else { date };
    state.touch("inspectionDate");

    state.procedure_number = ask("Número de trámite", true)?;
    state.touch("procedureNumber");

    let ids = ask("Ids de inspectores asignados (separados por coma)", true)?;
    state.inspector_ids = ids
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    state.touch("inspectorIds");

    let labels: Vec<&str> = ApplicantType::ALL.iter().map(|t| t.label()).collect();
    let chosen = choose("Tipo de solicitante", &labels)?;
    state.applicant_type = ApplicantType::ALL[chosen];

    match state.applicant_type {
        ApplicantType::Anonymous => {}
        ApplicantType::Individual => {
            state.individual.first_name = ask("Nombre", true)?;
            state.touch("firstName");
            state.individual.last_name1 = ask("Primer apellido", true)?;
            state.touch("lastName1");
            state.individual.last_name2 = ask("Segundo apellido (opcional)", true)?;
            state.individual.national_id = ask("Cédula (ej: 5-0123-0456)", true)?;
            state.touch("nationalId");
        }
        ApplicantType::LegalEntity => {
            state.legal_entity.legal_name = ask("Razón social", true)?;
            state.touch("legalName");
            state.legal_entity.legal_id = ask("Cédula jurídica (ej: 3-101-123456)", true)?;
            state.touch("legalId");
        }
    }
    Ok(())
}

fn prompt_location(state: &mut FormState) -> Result<()> {
    let labels: Vec<&str> = District::ALL.iter().map(|d| d.label()).collect();
    let chosen = choose("Distrito", &labels)?;
    state.location.district = District::ALL[chosen];

    state.location.exact_address = ask("Dirección exacta", true)?;
    state.touch("exactAddress");
    Ok(())
}

fn prompt_dependency(state: &mut FormState) -> Result<()> {
    let labels: Vec<String> = Dependency::ALL
        .iter()
        .map(|d| {
            if d.is_available() {
                d.label().to_string()
            } else {
                format!("{} (no disponible)", d.label())
            }
        })
        .collect();
    let refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
    let chosen = choose("Dependencia destino", &refs)?;
    state.dependency = Some(Dependency::ALL[chosen]);
    state.touch("dependency");
    Ok(())
}

fn prompt_details(form: &mut IntakeForm) -> Result<()> {
    let Some(dependency) = form.state.dependency else {
        return Ok(());
    };

    match dependency {
        Dependency::MayorOffice => {
            form.state.mayor_office.procedure_type = ask("Tipo de gestión", true)?;
            form.state.touch("mayorOffice.procedureType");
            form.state.mayor_office.observations = ask("Observaciones (opcional)", true)?;
        }
        Dependency::Constructions => prompt_constructions(form)?,
        Dependency::ZmtConcession => prompt_zmt(form)?,
        Dependency::PlatformAndService => {
            form.state.platform.procedure_number = ask("Número de trámite de plataforma", true)?;
            form.state.touch("platformAndService.procedureNumber");
            form.state.platform.observation = ask("Observación (opcional)", true)?;
        }
        Dependency::Collection => prompt_collection(form)?,
        Dependency::WorkClosure => prompt_work_closure(form)?,
        Dependency::TaxesAndLicenses | Dependency::RealEstate => {
            // la validación del paso 3 ya lo rechaza; no hay campos aquí
        }
    }

    let plan = sections::resolve(dependency, form.state.constructions.procedure);
    for &slot in plan.required_photo_slots {
        prompt_photo(form, slot, true)?;
    }
    for &slot in sections::dependency_slots(dependency, form.state.constructions.procedure) {
        if !plan.required_photo_slots.contains(&slot) {
            prompt_photo(form, slot, false)?;
        }
    }
    Ok(())
}

fn prompt_constructions(form: &mut IntakeForm) -> Result<()> {
    let labels: Vec<&str> = ConstructionProcedure::ALL.iter().map(|p| p.label()).collect();
    let chosen = choose("Trámite de construcciones", &labels)?;
    let procedure = ConstructionProcedure::ALL[chosen];
    form.state.constructions.procedure = Some(procedure);

    match procedure {
        ConstructionProcedure::LandUse => {
            form.state.constructions.land_use.requested_use = ask("Uso solicitado", true)?;
            form.state.touch("constructions.requestedUse");
            form.state.constructions.land_use.property_number =
                ask("Número de finca (opcional)", true)?;
            form.state.constructions.land_use.cadastral_number =
                ask("Número de catastro (opcional)", true)?;
            form.state.constructions.land_use.observations =
                ask("Observaciones (opcional)", true)?;
        }
        ConstructionProcedure::Antiquity => {
            form.state.constructions.antiquity.property_number = ask("Número de finca", true)?;
            form.state.touch("constructions.propertyNumber");
            form.state.constructions.antiquity.estimated_age =
                ask("Antigüedad estimada (opcional)", true)?;
            form.state.constructions.antiquity.observations =
                ask("Observaciones (opcional)", true)?;
        }
        ConstructionProcedure::PcCancellation => {
            form.state.constructions.pc_cancellation.permit_number =
                ask("Número de permiso", true)?;
            form.state.touch("constructions.permitNumber");
            form.state.constructions.pc_cancellation.reason = ask("Motivo de anulación", true)?;
            form.state.touch("constructions.reason");
        }
        ConstructionProcedure::GeneralInspection => {
            form.state.constructions.general_inspection.details =
                ask("Detalle de la inspección", true)?;
            form.state.touch("constructions.details");
        }
        ConstructionProcedure::WorkReceived => {
            form.state.constructions.work_received.permit_number =
                ask("Número de permiso", true)?;
            form.state.touch("constructions.permitNumber");
            form.state.constructions.work_received.observations =
                ask("Observaciones (opcional)", true)?;
        }
    }
    Ok(())
}

fn prompt_zmt(form: &mut IntakeForm) -> Result<()> {
    form.state.zmt.file_number = ask("Número de expediente", true)?;
    form.state.touch("zmtConcession.fileNumber");
    form.state.zmt.concession_type = ask("Tipo de concesión", true)?;
    form.state.touch("zmtConcession.concessionType");
    form.state.zmt.granted_at = ask("Fecha de otorgamiento (AAAA-MM-DD)", true)?;
    form.state.touch("zmtConcession.grantedAt");
    form.state.zmt.expires_at = ask("Fecha de vencimiento (AAAA-MM-DD)", true)?;
    form.state.touch("zmtConcession.expiresAt");
    form.state.zmt.observations = ask("Observaciones (opcional)", true)?;

    let mut index = 0;
    loop {
        println!("— Parcela {} —", index + 1);
        let parcel = &mut form.state.zmt.parcels[index];
        parcel.plan_number = ask("Número de plano", true)?;
        parcel.area = ask("Área (opcional)", true)?;
        parcel.parcel_use = ask("Uso de la parcela (opcional)", true)?;
        parcel.lessee_name = ask("Nombre del concesionario (opcional)", true)?;

        if !confirm("¿Agregar otra parcela?", false)? {
            break;
        }
        form.state.add_parcel();
        index += 1;
    }
    Ok(())
}

fn prompt_collection(form: &mut IntakeForm) -> Result<()> {
    if confirm("¿Cuenta con la firma del notificado?", true)? {
        prompt_photo(form, slots::SIGNATURE, true)?;
    } else {
        form.state.collection.nobody_present = confirm("¿No había nadie presente?", false)?;
        form.state.collection.wrong_address = confirm("¿Dirección incorrecta?", false)?;
        form.state.collection.moved_address = confirm("¿Se mudó de dirección?", false)?;
        form.state.collection.refused_to_sign = confirm("¿Se negó a firmar?", false)?;
        form.state.collection.not_located = confirm("¿No fue localizado?", false)?;
        form.state.collection.other = ask("Otro motivo (opcional)", true)?;
    }
    form.state.touch("collection.firma");
    Ok(())
}

fn prompt_work_closure(form: &mut IntakeForm) -> Result<()> {
    form.state.work_closure.property_number = ask("Número de finca (opcional)", true)?;
    form.state.work_closure.cadastral_number = ask("Número de catastro (opcional)", true)?;
    form.state.touch("workClosure.propertyNumber");
    form.state.work_closure.contract_number = ask("Número de contrato (opcional)", true)?;
    form.state.work_closure.permit_number = ask("Número de permiso (opcional)", true)?;
    form.state.work_closure.assessed_area = ask("Área tasada (opcional)", true)?;
    form.state.work_closure.built_area = ask("Área construida (opcional)", true)?;
    form.state.work_closure.visit_number = ask("Número de visita", true)?;
    form.state.touch("workClosure.visitNumber");
    form.state.work_closure.work_receipt = ask("Recibo de obra (opcional)", true)?;
    form.state.work_closure.actions = ask("Acciones realizadas", true)?;
    form.state.touch("workClosure.actions");
    form.state.work_closure.observations = ask("Observaciones (opcional)", true)?;
    Ok(())
}

/// Pide la ruta de una foto y la adjunta; repite hasta que la casilla
/// acepte el archivo (o se omita, si es opcional).
fn prompt_photo(form: &mut IntakeForm, key: &str, required: bool) -> Result<()> {
    loop {
        let hint = if required {
            "requerida"
        } else {
            "opcional, Enter para omitir"
        };
        let path = ask(&format!("Foto '{}' ({}) - ruta del archivo", key, hint), true)?;

        if path.is_empty() {
            if required {
                println!("  ✖ {}", crate::photos::MSG_REQUIRED);
                continue;
            }
            return Ok(());
        }

        let file = match PhotoFile::from_path(Path::new(&path)) {
            Ok(file) => file,
            Err(err) => {
                println!("  ✖ {}", err);
                continue;
            }
        };

        match form.photos.attach(key, Some(file))? {
            AttachOutcome::Stored => return Ok(()),
            AttachOutcome::Cleared => return Ok(()),
            AttachOutcome::Rejected(message) => {
                println!("  ✖ {}", message);
            }
        }
    }
}
