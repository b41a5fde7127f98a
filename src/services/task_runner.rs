//! Corredor de tareas periódicas
//!
//! El proceso raíz es dueño de los timers y los inyecta aquí; los
//! servicios de barrido no saben nada de relojes de pared, así que los
//! tests pueden invocar la lógica de barrido de forma síncrona.
//!
//! Dos lazos: expiración (al arrancar y luego cada pocos minutos, para
//! acotar la ventana en que un horario vencido sigue viéndose `assigned`)
//! y generación de pagos (al arrancar y luego una vez al día poco después
//! de medianoche local, para que "ayer" quede cobrable y "hoy" reciba su
//! placeholder).

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::services::sweep_service::SweepService;
use crate::state::AppState;
use crate::utils::day_range;

/// Lanzar los dos lazos de conciliación en background
pub fn spawn_reconciliation_tasks(state: &AppState) -> Vec<JoinHandle<()>> {
    let expiration = {
        let state = state.clone();
        tokio::spawn(async move { expiration_loop(state).await })
    };
    let payments = {
        let state = state.clone();
        tokio::spawn(async move { payment_loop(state).await })
    };
    vec![expiration, payments]
}

async fn expiration_loop(state: AppState) {
    let sweeps = SweepService::new(state.pool.clone(), state.config.fleet_offset());
    let period = Duration::from_secs(state.config.expiration_sweep_minutes.max(1) * 60);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        "⏰ Lazo de expiración activo (cada {} min)",
        state.config.expiration_sweep_minutes.max(1)
    );

    loop {
        // El primer tick dispara de inmediato: corrida de arranque
        ticker.tick().await;
        let started = std::time::Instant::now();

        match sweeps.run_expiration_sweep().await {
            Ok(report) if !report.errors.is_empty() => {
                warn!(
                    "⏰ Barrido de expiración terminó con {} errores aislados",
                    report.errors.len()
                );
            }
            Ok(_) => {}
            Err(e) => error!("❌ Barrido de expiración falló por completo: {}", e),
        }

        // Un barrido no debe invadir el tick siguiente; si pasa, se
        // loguea y se sigue
        if started.elapsed() > period {
            warn!(
                "⚠️ El barrido de expiración tardó {:?}, más que su intervalo {:?}",
                started.elapsed(),
                period
            );
        }
    }
}

async fn payment_loop(state: AppState) {
    let sweeps = SweepService::new(state.pool.clone(), state.config.fleet_offset());
    let offset = state.config.fleet_offset();
    let minutes_after_midnight = state.config.payment_sweep_minutes_after_midnight;

    info!(
        "🧾 Lazo de pagos activo (diario, {} min después de medianoche local)",
        minutes_after_midnight
    );

    // Corrida de arranque
    if let Err(e) = sweeps.run_payment_sweep().await {
        error!("❌ Barrido de pagos inicial falló: {}", e);
    }

    loop {
        let wait = duration_until_next_daily_anchor(Utc::now(), offset, minutes_after_midnight);
        tokio::time::sleep(wait).await;

        if let Err(e) = sweeps.run_payment_sweep().await {
            error!("❌ Barrido de pagos falló: {}", e);
        }
    }
}

/// Cuánto falta para la próxima ancla diaria (medianoche local +
/// `minutes_after_midnight`)
fn duration_until_next_daily_anchor(
    now: DateTime<Utc>,
    offset: FixedOffset,
    minutes_after_midnight: u32,
) -> Duration {
    let local = now.with_timezone(&offset);
    let anchor_time = NaiveTime::from_num_seconds_from_midnight_opt(
        minutes_after_midnight.min(23 * 60 + 59) * 60,
        0,
    )
    .unwrap_or(NaiveTime::MIN);

    let mut anchor_day = local.date_naive();
    if local.time() >= anchor_time {
        anchor_day = anchor_day + ChronoDuration::days(1);
    }

    let anchor_utc = day_range::local_datetime_to_utc(anchor_day, anchor_time, offset);
    (anchor_utc - now)
        .to_std()
        .unwrap_or_else(|_| Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_anchor_later_today() {
        // 00:05 UTC con ancla a las 00:10 → faltan 5 minutos
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 5, 0).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        let wait = duration_until_next_daily_anchor(now, offset, 10);
        assert_eq!(wait, Duration::from_secs(5 * 60));
    }

    #[test]
    fn test_anchor_rolls_to_next_day() {
        // 00:15 con ancla a las 00:10 → próxima es mañana, 23h55m
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 15, 0).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        let wait = duration_until_next_daily_anchor(now, offset, 10);
        assert_eq!(wait, Duration::from_secs((23 * 60 + 55) * 60));
    }

    #[test]
    fn test_anchor_respects_local_offset() {
        // 03:00 UTC a UTC-5 son las 22:00 locales del día anterior:
        // la próxima ancla local (00:10) cae en ~2h10m
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap();
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let wait = duration_until_next_daily_anchor(now, offset, 10);
        assert_eq!(wait, Duration::from_secs((2 * 60 + 10) * 60));
    }
}
