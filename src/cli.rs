use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inspecciones")]
#[command(about = "Gestión de inspecciones municipales: ingreso multi-paso y envío", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Registro detallado
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crear una inspección con el asistente de 4 pasos
    New,

    /// Mostrar/editar la configuración
    Config {
        /// Guardar el token de acceso
        #[arg(long)]
        set_token: Option<String>,

        /// Guardar la URL base del backend
        #[arg(long)]
        set_base_url: Option<String>,

        /// Mostrar la configuración actual
        #[arg(long)]
        show: bool,
    },

    /// Mostrar el usuario del token configurado
    Whoami,
}
