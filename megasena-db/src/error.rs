use thiserror::Error;

/// Erreurs locales et récupérables du moteur d'analyse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SenaError {
    /// Un tirage n'a pas exactement 6 numéros distincts dans [1,60].
    #[error("Tirage invalide : {0}")]
    InvalidDraw(String),

    /// Agrégation demandée sur un historique vide.
    #[error("Historique vide : aucune agrégation possible")]
    EmptyDataset,

    /// Moins de 6 numéros valides et distincts dans le pari.
    #[error("Pari incomplet : {valid} numéro(s) valide(s) sur 6")]
    IncompleteBet { valid: usize },

    /// Les statistiques chaud/froid ne couvrent pas les 60 numéros, dans l'ordre.
    #[error("Statistiques chaud/froid invalides : {found} entrée(s), 60 attendues de 1 à 60")]
    InvalidHotCold { found: usize },

    /// L'historique n'est pas trié du plus récent au plus ancien.
    #[error("Historique non ordonné : le tirage à l'index {index} est plus récent que son prédécesseur")]
    UnorderedHistory { index: usize },
}

pub type SenaResult<T> = Result<T, SenaError>;
