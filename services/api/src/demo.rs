use crate::infra::seeded_store;
use chrono::{Local, NaiveDate};
use clap::Args;
use conduta::domain::{parse_rows, Acao, Aluno, Pernoite, TipoAcao};
use conduta::error::AppError;
use conduta::params::Params;
use conduta::programacao::fechar_pendentes;
use conduta::reports::{pernoite_pdf, planilha_conceitos, zip_pelotao, ReportError};
use conduta::scoring::{avaliar_turma, ScoringEngine};
use conduta::store::{tables, TableStore};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Restrict the board and the FAIA bundle to one platoon.
    #[arg(long)]
    pub(crate) pelotao: Option<String>,
    /// Roster date for the overnight-stay PDF (YYYY-MM-DD).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) data_pernoite: Option<NaiveDate>,
    /// Directory to write the demo exports into (skipped when absent).
    #[arg(long)]
    pub(crate) saida: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = seeded_store(Duration::from_secs(30));

    let params = Params::from_relation(&store.load(tables::CONFIG)?);
    let alunos = parse_rows(&store.load(tables::ALUNOS)?, tables::ALUNOS, Aluno::from_row);
    let tipos = parse_rows(
        &store.load(tables::TIPOS_ACAO)?,
        tables::TIPOS_ACAO,
        TipoAcao::from_row,
    );
    let acoes = parse_rows(&store.load(tables::ACOES)?, tables::ACOES, Acao::from_row);

    let engine = ScoringEngine::new(tipos.items, params.clone());
    let saldos = engine.saldos(&acoes.items, &alunos.items);
    let mut avaliacoes = avaliar_turma(&alunos.items, &saldos.saldos, &params);
    if let Some(pelotao) = &args.pelotao {
        avaliacoes.retain(|a| a.pelotao.eq_ignore_ascii_case(pelotao));
    }

    println!("Conceitos board");
    println!(
        "{:<8} {:<10} {:<12} {:>7} {:>7} {:>8} {:>6}",
        "Nº", "Guerra", "Pelotão", "Saldo", "Média", "Conceito", "Class."
    );
    for avaliacao in &avaliacoes {
        println!(
            "{:<8} {:<10} {:<12} {:>7.2} {:>7.2} {:>8.2} {:>6.2}",
            avaliacao.numero_interno,
            avaliacao.nome_guerra,
            avaliacao.pelotao,
            avaliacao.saldo_pontos,
            avaliacao.media_academica,
            avaliacao.conceito_final,
            avaliacao.classificacao_prevista,
        );
    }
    println!(
        "Defects: {} without subject, {} without type, {} without date",
        saldos.acoes_sem_aluno, saldos.acoes_sem_tipo, saldos.acoes_sem_data
    );

    let agora = Local::now().naive_local();
    let fechados = fechar_pendentes(store.as_ref(), agora)?;
    println!("\nSchedule closer: {} entries closed", fechados.len());

    let Some(saida) = args.saida else {
        return Ok(());
    };
    std::fs::create_dir_all(&saida)?;

    let csv = planilha_conceitos(&avaliacoes, None)?;
    let csv_path = saida.join("conceitos.csv");
    std::fs::write(&csv_path, csv)?;
    println!("Wrote {}", csv_path.display());

    if let Some(pelotao) = &args.pelotao {
        let bundle = zip_pelotao(&alunos.items, &acoes.items, pelotao)?;
        let zip_path = saida.join("faia.zip");
        std::fs::write(&zip_path, bundle)?;
        println!("Wrote {}", zip_path.display());
    }

    let data = args
        .data_pernoite
        .unwrap_or_else(|| Local::now().date_naive());
    let pernoites = parse_rows(
        &store.load(tables::PERNOITE)?,
        tables::PERNOITE,
        Pernoite::from_row,
    );
    match pernoite_pdf(&alunos.items, &pernoites.items, data, &params) {
        Ok(pdf) => {
            let pdf_path = saida.join("pernoite.pdf");
            std::fs::write(&pdf_path, pdf)?;
            println!("Wrote {}", pdf_path.display());
        }
        Err(ReportError::SemMarcados(data)) => {
            println!("No overnight-stay subjects marked for {data}; PDF skipped");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
