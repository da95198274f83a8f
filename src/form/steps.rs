//! Navegador de pasos del formulario
//!
//! Máquina de estados con pasos 1..4; el envío solo está disponible en el
//! paso 4. `next` valida el alcance del paso actual; `prev` nunca valida.
//! La bandera `nav_busy` bloquea disparos de navegación reentrantes
//! (doble clic rápido).

use crate::form::rules::{self, Violation};
use crate::form::sections;
use crate::form::FormState;
use crate::photos::PhotoManager;

/// Paso del asistente. El orden es el de avance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    /// Paso 1: datos del trámite y del solicitante.
    Applicant,
    /// Paso 2: ubicación.
    Location,
    /// Paso 3: elección de dependencia.
    Dependency,
    /// Paso 4: bloque específico de la dependencia + fotos requeridas.
    Details,
}

impl Step {
    pub const ALL: &'static [Step] = &[
        Step::Applicant,
        Step::Location,
        Step::Dependency,
        Step::Details,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Step::Applicant => 1,
            Step::Location => 2,
            Step::Dependency => 3,
            Step::Details => 4,
        }
    }

    fn index(&self) -> usize {
        (self.number() - 1) as usize
    }

    fn following(&self) -> Option<Step> {
        Step::ALL.get(self.index() + 1).copied()
    }

    fn preceding(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Step::ALL[i])
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Applicant => "Datos del solicitante",
            Step::Location => "Ubicación",
            Step::Dependency => "Dependencia",
            Step::Details => "Detalle y fotos",
        }
    }
}

/// Resultado de un intento de navegación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Avanzó al paso indicado.
    Advanced(Step),
    /// El paso 4 quedó validado; el envío puede proceder.
    ReadyToSubmit,
    /// La validación falló; si el fallo incluye fotos, `first_missing_slot`
    /// indica la casilla que la interfaz debe enfocar.
    Blocked {
        violations: Vec<Violation>,
        first_missing_slot: Option<&'static str>,
    },
    /// Hay una navegación en curso; el disparo se ignora.
    Busy,
}

#[derive(Debug, Clone)]
pub struct StepNavigator {
    step: Step,
    nav_busy: bool,
    show_errors: [bool; 4],
}

impl StepNavigator {
    pub fn new() -> Self {
        StepNavigator {
            step: Step::Applicant,
            nav_busy: false,
            show_errors: [false; 4],
        }
    }

    pub fn current(&self) -> Step {
        self.step
    }

    /// Bandera "mostrar errores" del paso, activada por un avance fallido.
    pub fn show_errors(&self, step: Step) -> bool {
        self.show_errors[step.index()]
    }

    pub fn is_busy(&self) -> bool {
        self.nav_busy
    }

    /// Toma el candado de navegación. Devuelve `false` si ya estaba tomado.
    pub fn try_begin(&mut self) -> bool {
        if self.nav_busy {
            return false;
        }
        self.nav_busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.nav_busy = false;
    }

    /// Intenta avanzar validando el alcance del paso actual. En el paso 4
    /// la validación incluye las fotos requeridas y el resultado exitoso es
    /// `ReadyToSubmit` en lugar de un avance.
    pub fn next(&mut self, state: &FormState, photos: &mut PhotoManager) -> NavOutcome {
        if !self.try_begin() {
            return NavOutcome::Busy;
        }
        let outcome = self.next_inner(state, photos);
        self.finish();
        outcome
    }

    fn next_inner(&mut self, state: &FormState, photos: &mut PhotoManager) -> NavOutcome {
        let mut violations = rules::validate_step(state, photos, self.step);
        let mut first_missing_slot = None;

        if self.step == Step::Details {
            if let Some(dependency) = state.dependency {
                let plan = sections::resolve(dependency, state.constructions.procedure);
                let check = photos.validate_required(plan.required_photo_slots);
                first_missing_slot = check.first_missing();
                for key in &check.missing {
                    violations.push(Violation {
                        field: format!("photos.{}", key),
                        message: crate::photos::MSG_REQUIRED.to_string(),
                    });
                }
            }
        }

        if !violations.is_empty() {
            self.show_errors[self.step.index()] = true;
            return NavOutcome::Blocked {
                violations,
                first_missing_slot,
            };
        }

        self.show_errors[self.step.index()] = false;
        match self.step.following() {
            Some(next) => {
                self.step = next;
                NavOutcome::Advanced(next)
            }
            None => NavOutcome::ReadyToSubmit,
        }
    }

    /// Retrocede sin validar. En el paso 1, o con una navegación en curso,
    /// no hace nada.
    pub fn prev(&mut self) -> Step {
        if self.nav_busy {
            return self.step;
        }
        if let Some(previous) = self.step.preceding() {
            self.step = previous;
        }
        self.step
    }

    pub fn can_submit(&self) -> bool {
        self.step == Step::Details
    }

    /// Activa la bandera de errores de un paso (la usa el orquestador
    /// cuando la compuerta final de envío falla).
    pub fn flag_errors(&mut self, step: Step) {
        self.show_errors[step.index()] = true;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StepNavigator {
    fn default() -> Self {
        Self::new()
    }
}
