//! Feature gate backed by the `Permissions` table. A denial
//! short-circuits the caller before any derivation or write happens.

use crate::store::{field, tables, StoreError, TableStore};

#[derive(Debug, thiserror::Error)]
pub enum PermissaoError {
    #[error("profile '{perfil}' may not use '{feature}'")]
    Negado { feature: String, perfil: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// True when the comma-separated profile list names the profile, or
/// when the list is empty (feature open to everyone).
fn perfil_autorizado(perfis: &str, perfil: &str) -> bool {
    let lista: Vec<&str> = perfis
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    lista.is_empty() || lista.iter().any(|p| p.eq_ignore_ascii_case(perfil))
}

/// Checks the gate for one feature. Features without a registry row
/// are open; a row can disable the feature outright or restrict it to
/// listed profiles.
pub fn exigir<S: TableStore>(store: &S, feature: &str, perfil: &str) -> Result<(), PermissaoError> {
    let relation = store.load(tables::PERMISSIONS)?;
    let Some(row) = relation.find("feature_key", feature) else {
        return Ok(());
    };

    let habilitado = field(row, "habilitado");
    let desligado = matches!(
        habilitado.to_lowercase().as_str(),
        "false" | "0" | "nao" | "não" | "n"
    );
    if desligado || !perfil_autorizado(field(row, "perfis"), perfil) {
        return Err(PermissaoError::Negado {
            feature: feature.to_string(),
            perfil: perfil.to_string(),
        });
    }
    Ok(())
}
