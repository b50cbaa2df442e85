//! Subcommand handlers.
//!
//! Each handler builds the view-model it needs, runs one action and
//! prints the result: a plain table by default, JSON with `--json`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use sonique_app::admin::{AnalyticsDashboard, CategoryAdmin, CertificationsAdmin, PaymentsAdmin};
use sonique_app::download::{DownloadEvent, DownloadTarget, DownloadTracker, FileSink};
use sonique_app::edit_sound::EditSound;
use sonique_app::events::EventsPage;
use sonique_app::likes::LikeController;
use sonique_app::loader::{FilteredList, ListSource};
use sonique_app::moderation::{ClipModeration, SoundModeration};
use sonique_app::sources::{CatalogSounds, CategorySounds};
use sonique_app::toast::ToastKind;
use sonique_app::{AppContext, AppError};
use sonique_client::MarketplaceApi;
use sonique_core::filter::FilterState;
use sonique_core::forms::{CategoryForm, ImageUpload, RejectionForm};
use sonique_core::models::{Clip, Identified, Sound};
use sonique_core::moderation::BatchAction;
use sonique_core::status::StatusBadge;
use sonique_core::types::DbId;

use crate::{CategoryArgs, EditArgs, ListArgs};

pub struct Runner {
    ctx: AppContext,
    api: Arc<MarketplaceApi>,
    json: bool,
}

impl Runner {
    pub fn new(ctx: AppContext, api: Arc<MarketplaceApi>, json: bool) -> Self {
        Self { ctx, api, json }
    }

    /// Print the toasts raised while the command ran.
    pub async fn flush_toasts(&self) {
        for toast in self.ctx.toasts.history().await {
            let tag = match toast.kind {
                ToastKind::Info => "info",
                ToastKind::Success => "ok",
                ToastKind::Error => "erreur",
                ToastKind::LoginRequired => "connexion",
            };
            eprintln!("[{tag}] {}", toast.message);
        }
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub async fn sounds(&self, category: Option<DbId>, args: ListArgs) -> anyhow::Result<()> {
        let mut filter = FilterState::default();
        if let Some(search) = args.search {
            filter.search = search;
        }
        if let Some(sort) = args.sort {
            filter.sort = sort;
        }
        if let Some(status) = args.status {
            filter.status = status;
        }

        match category {
            Some(category_id) => {
                let source = CategorySounds {
                    api: Arc::clone(&self.api),
                    category_id,
                };
                let list = FilteredList::with_filter(source, self.ctx.clone(), filter);
                self.print_sounds(&list, args.pages).await
            }
            None => {
                let list = FilteredList::with_filter(
                    CatalogSounds(Arc::clone(&self.api)),
                    self.ctx.clone(),
                    filter,
                );
                self.print_sounds(&list, args.pages).await
            }
        }
    }

    async fn print_sounds<S: ListSource<Sound>>(
        &self,
        list: &FilteredList<Sound, S>,
        pages: u32,
    ) -> anyhow::Result<()> {
        fetch_pages(list, pages).await?;
        let sounds = list.items().await;
        if self.json {
            return print_json(&sounds);
        }
        if list.is_empty().await {
            println!("Aucun son trouvé");
            return Ok(());
        }
        for sound in &sounds {
            println!(
                "{:>6}  {:<40} {:>12}  {:>5} likes{}",
                sound.id,
                truncate(&sound.title, 40),
                sound.price_label(),
                sound.likes_count,
                if sound.is_liked { " *" } else { "" },
            );
        }
        let pagination = list.pagination().await;
        println!(
            "{} son(s) affiché(s) sur {}{}",
            sounds.len(),
            pagination.total,
            if list.show_load_more().await {
                ", --pages pour en voir plus"
            } else {
                ""
            }
        );
        Ok(())
    }

    pub async fn categories(&self) -> anyhow::Result<()> {
        let categories = self.api.list_categories().await.map_err(AppError::Api)?;
        if self.json {
            return print_json(&categories);
        }
        for category in &categories {
            println!("{:>4}  {:<30} {} sons", category.id, category.name, category.sounds_count);
        }
        Ok(())
    }

    pub async fn like(&self, id: DbId, clip: bool) -> anyhow::Result<()> {
        let state = if clip {
            LikeController::<Clip, _>::new(self.ctx.clone(), Arc::clone(&self.api))
                .toggle_unlisted(id)
                .await?
        } else {
            LikeController::<Sound, _>::new(self.ctx.clone(), Arc::clone(&self.api))
                .toggle_unlisted(id)
                .await?
        };
        if self.json {
            return print_json(&state);
        }
        let verb = if state.is_liked { "aimé" } else { "retiré des favoris" };
        println!("#{id} {verb} ({} likes)", state.likes_count);
        Ok(())
    }

    pub async fn download(&self, id: DbId, title: Option<String>) -> anyhow::Result<()> {
        let title = match title {
            Some(title) => title,
            None => {
                let token = self.ctx.session.token().await;
                self.api
                    .get_sound(id, token.as_ref())
                    .await
                    .map_err(AppError::Api)?
                    .title
            }
        };

        let tracker = DownloadTracker::from_context(self.ctx.clone());
        let download = tracker.download(self.api.as_ref(), DownloadTarget::Sound(id), &title);
        let path = with_progress(&tracker, download).await?;
        println!("{}", path.display());
        Ok(())
    }

    pub async fn edit(&self, args: EditArgs) -> anyhow::Result<()> {
        let edit = EditSound::new(self.ctx.clone(), Arc::clone(&self.api), args.id);
        edit.load().await?;

        edit.edit(|form| {
            if let Some(title) = args.title {
                form.title = title;
            }
            if let Some(description) = args.description {
                form.description = Some(description);
            }
            if let Some(category_id) = args.category_id {
                form.category_id = Some(category_id);
            }
            if let Some(tags) = args.tags {
                form.tags = tags;
            }
            if let Some(price) = args.price {
                form.price = price;
            }
            if args.free {
                form.is_free = true;
            } else if args.paid {
                form.is_free = false;
            }
        })
        .await;

        match edit.submit().await {
            Ok(sound) if self.json => print_json(&sound),
            Ok(sound) => {
                println!("#{} {} ({})", sound.id, sound.title, sound.price_label());
                Ok(())
            }
            Err(err) => {
                print_field_errors(&err);
                Err(err.into())
            }
        }
    }

    pub async fn events(&self, competitions: bool, pages: u32) -> anyhow::Result<()> {
        let page = EventsPage::new(self.ctx.clone(), Arc::clone(&self.api));
        if competitions {
            fetch_pages(page.competitions(), pages).await?;
            let items = page.competitions().items().await;
            if self.json {
                return print_json(&items);
            }
            for competition in &items {
                let spots = competition
                    .spots_left()
                    .map_or_else(|| "illimité".to_string(), |n| format!("{n} place(s)"));
                println!(
                    "{:>5}  {:<40} {:<10} {}",
                    competition.id,
                    truncate(&competition.title, 40),
                    competition.status.badge().label,
                    spots
                );
            }
        } else {
            fetch_pages(page.events(), pages).await?;
            let items = page.events().items().await;
            if self.json {
                return print_json(&items);
            }
            for event in &items {
                let seats = match event.remaining_capacity() {
                    Some(0) => "complet".to_string(),
                    Some(n) => format!("{n} place(s)"),
                    None => "illimité".to_string(),
                };
                println!(
                    "{:>5}  {:<40} {}  {}",
                    event.id,
                    truncate(&event.title, 40),
                    event.starts_at.format("%d/%m/%Y %H:%M"),
                    seats
                );
            }
        }
        Ok(())
    }

    pub async fn register(&self, id: DbId) -> anyhow::Result<()> {
        let page = EventsPage::new(self.ctx.clone(), Arc::clone(&self.api));
        page.open_event(id).await?;
        let event = page.register(id, chrono::Utc::now()).await?;
        if self.json {
            return print_json(&event);
        }
        println!("Inscrit à « {} »", event.title);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Moderation
    // -----------------------------------------------------------------------

    pub async fn moderation_sounds(&self, status: String) -> anyhow::Result<()> {
        let moderation = SoundModeration::new(self.ctx.clone(), Arc::clone(&self.api));
        moderation.filter_status(status).await?;
        let sounds = moderation.list().items().await;
        if self.json {
            return print_json(&sounds);
        }
        for sound in &sounds {
            println!(
                "{:>6}  {:<40} {:<10} {}",
                sound.id,
                truncate(&sound.title, 40),
                sound.status.badge().label,
                sound.artist.as_deref().unwrap_or("-")
            );
        }
        for (status, ids) in moderation.buckets().await {
            if !ids.is_empty() {
                println!("{status}: {}", ids.len());
            }
        }
        Ok(())
    }

    pub async fn approve_sound(&self, id: DbId) -> anyhow::Result<()> {
        SoundModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .approve(id)
            .await?;
        Ok(())
    }

    pub async fn reject_sound(&self, id: DbId, reason: String) -> anyhow::Result<()> {
        let result = SoundModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .reject(id, &RejectionForm::new(reason))
            .await;
        check(result)
    }

    pub async fn delete_sound(&self, id: DbId) -> anyhow::Result<()> {
        cancellable(
            SoundModeration::new(self.ctx.clone(), Arc::clone(&self.api))
                .delete(id)
                .await,
        )
    }

    pub async fn moderation_clips(&self, status: String) -> anyhow::Result<()> {
        let moderation = ClipModeration::new(self.ctx.clone(), Arc::clone(&self.api));
        moderation.filter_status(status).await?;
        let clips = moderation.list().items().await;
        if self.json {
            return print_json(&clips);
        }
        for clip in &clips {
            println!(
                "{:>6}  {:<40} {:<10} {}{}",
                clip.id,
                truncate(&clip.title, 40),
                clip.status.badge().label,
                clip.user.as_ref().map_or("-", |u| u.name.as_str()),
                if clip.is_featured { "  [à la une]" } else { "" }
            );
        }
        for (status, count) in moderation.counts().await {
            println!("{status}: {count}");
        }
        Ok(())
    }

    pub async fn approve_clip(&self, id: DbId) -> anyhow::Result<()> {
        ClipModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .approve(id)
            .await?;
        Ok(())
    }

    pub async fn reject_clip(&self, id: DbId, reason: String) -> anyhow::Result<()> {
        let result = ClipModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .reject(id, &RejectionForm::new(reason))
            .await;
        check(result)
    }

    pub async fn feature_clip(&self, id: DbId) -> anyhow::Result<()> {
        ClipModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .toggle_featured(id)
            .await?;
        Ok(())
    }

    pub async fn clip_batch(
        &self,
        action: BatchAction,
        ids: Vec<DbId>,
        reason: Option<String>,
    ) -> anyhow::Result<()> {
        let reason = reason.map(RejectionForm::new);
        let result = ClipModeration::new(self.ctx.clone(), Arc::clone(&self.api))
            .batch(&ids, action, reason.as_ref())
            .await;
        cancellable(result.map(|_| ()))
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub async fn admin_categories(&self) -> anyhow::Result<()> {
        let admin = CategoryAdmin::new(self.ctx.clone(), Arc::clone(&self.api));
        admin.load().await?;
        let categories = admin.categories().await;
        if self.json {
            return print_json(&categories);
        }
        for category in &categories {
            println!(
                "{:>4}  {:<30} {:>3}  {:<8} {}",
                category.id,
                category.name,
                category.sort_order,
                category.color.as_deref().unwrap_or("-"),
                if category.is_active { "active" } else { "inactive" }
            );
        }
        Ok(())
    }

    pub async fn save_category(&self, editing: Option<DbId>, args: CategoryArgs) -> anyhow::Result<()> {
        let image = match &args.image {
            Some(path) => Some(read_image(path).await?),
            None => None,
        };
        let form = CategoryForm {
            name: args.name,
            description: args.description,
            color: args.color,
            icon: args.icon,
            sort_order: args.sort_order,
            is_active: !args.inactive,
            image,
        };

        let admin = CategoryAdmin::new(self.ctx.clone(), Arc::clone(&self.api));
        match admin.save(editing, &form).await {
            Ok(category) if self.json => print_json(&category),
            Ok(category) => {
                println!("#{} {}", category.id, category.name);
                Ok(())
            }
            Err(err) => {
                print_field_errors(&err);
                Err(err.into())
            }
        }
    }

    pub async fn delete_category(&self, id: DbId) -> anyhow::Result<()> {
        cancellable(
            CategoryAdmin::new(self.ctx.clone(), Arc::clone(&self.api))
                .delete(id)
                .await,
        )
    }

    pub async fn toggle_category(&self, id: DbId) -> anyhow::Result<()> {
        let admin = CategoryAdmin::new(self.ctx.clone(), Arc::clone(&self.api));
        admin.load().await?;
        admin.toggle_active(id).await?;
        Ok(())
    }

    pub async fn payments(&self, status: Option<String>) -> anyhow::Result<()> {
        let admin = PaymentsAdmin::new(self.ctx.clone(), Arc::clone(&self.api));
        match status {
            Some(status) => {
                admin.filter_status(status).await?;
            }
            None => admin.load().await?,
        }
        let transactions = admin.transactions().items().await;

        if self.json {
            #[derive(Serialize)]
            struct Report<A, B, C> {
                stats: A,
                transactions: B,
                revenues: C,
            }
            return print_json(&Report {
                stats: admin.stats().await,
                transactions: &transactions,
                revenues: admin.revenues().await,
            });
        }

        if let Some(stats) = admin.stats().await {
            println!(
                "Revenus: {:.0} XAF  commission: {:.0} XAF  en attente: {}  remboursés: {}",
                stats.total_revenue, stats.platform_commission, stats.pending_count, stats.refunded_count
            );
        }
        for tx in &transactions {
            println!(
                "{:>6}  {:>10.0} XAF  {:<10} {:<25} {}",
                tx.id,
                tx.amount,
                tx.status.badge().label,
                truncate(tx.sound_title.as_deref().unwrap_or("-"), 25),
                tx.buyer_name.as_deref().unwrap_or("-")
            );
        }
        for revenue in admin.revenues().await {
            println!("{:<30} {:>10.0} XAF", revenue.artist_name, revenue.total_revenue);
        }
        Ok(())
    }

    pub async fn approve_payment(&self, id: DbId) -> anyhow::Result<()> {
        PaymentsAdmin::new(self.ctx.clone(), Arc::clone(&self.api))
            .approve(id)
            .await?;
        Ok(())
    }

    pub async fn reject_payment(&self, id: DbId, reason: String) -> anyhow::Result<()> {
        let result = PaymentsAdmin::new(self.ctx.clone(), Arc::clone(&self.api))
            .reject(id, &RejectionForm::new(reason))
            .await;
        check(result)
    }

    pub async fn refund(&self, id: DbId) -> anyhow::Result<()> {
        let admin = PaymentsAdmin::new(self.ctx.clone(), Arc::clone(&self.api));
        admin.transactions().reload().await?;
        cancellable(admin.refund(id).await)
    }

    pub async fn analytics(&self) -> anyhow::Result<()> {
        let dashboard = AnalyticsDashboard::new(self.ctx.clone(), Arc::clone(&self.api));
        let summary = dashboard.refresh().await?;
        let (global, users, content, trends) = (
            dashboard.global().await,
            dashboard.users().await,
            dashboard.content().await,
            dashboard.trends().await,
        );

        if self.json {
            #[derive(Serialize)]
            struct Report<A, B, C, D> {
                global: A,
                users: B,
                content: C,
                trends: D,
            }
            return print_json(&Report {
                global,
                users,
                content,
                trends,
            });
        }

        if let Some(g) = &global.data {
            println!(
                "Utilisateurs: {}  sons: {}  clips: {}  événements: {}  revenus: {:.0} XAF",
                g.total_users, g.total_sounds, g.total_clips, g.total_events, g.total_revenue
            );
        }
        if let Some(u) = &users.data {
            println!("Nouveaux: {}  actifs: {}  artistes: {}", u.new_users, u.active_users, u.artists);
        }
        if let Some(c) = &content.data {
            println!(
                "Écoutes: {}  téléchargements: {}  likes: {}  en modération: {}",
                c.total_plays, c.total_downloads, c.total_likes, c.pending_moderation
            );
        }
        if let Some(t) = &trends.data {
            match t.change_percent() {
                Some(change) => println!("Tendance: {change:+.1} % (pic {:.0})", t.peak()),
                None => println!("Tendance: données insuffisantes"),
            }
        }
        if summary.failed > 0 {
            println!("{} section(s) indisponible(s)", summary.failed);
        }
        Ok(())
    }

    pub async fn certifications(&self) -> anyhow::Result<()> {
        let admin = CertificationsAdmin::new(
            self.ctx.clone(),
            Arc::clone(&self.api),
            DownloadTracker::from_context(self.ctx.clone()),
        );
        let stats = admin.load_stats().await?;
        if self.json {
            return print_json(&stats);
        }
        println!(
            "Certifiés: {}  or: {}  platine: {}  diamant: {}  à examiner: {}",
            stats.total_certified, stats.gold, stats.platinum, stats.diamond, stats.pending_review
        );
        Ok(())
    }

    pub async fn certificate(&self, sound_id: DbId, pdf: bool, title: Option<String>) -> anyhow::Result<()> {
        let admin = CertificationsAdmin::new(
            self.ctx.clone(),
            Arc::clone(&self.api),
            DownloadTracker::from_context(self.ctx.clone()),
        );
        let certificate = admin.view_certificate(sound_id).await?;

        if pdf {
            let title = title.unwrap_or_else(|| certificate.sound_title.clone());
            let path = with_progress(admin.downloads(), admin.download_pdf(sound_id, &title)).await?;
            println!("{}", path.display());
            return Ok(());
        }
        if self.json {
            return print_json(&certificate);
        }
        println!(
            "{} -- {} ({})",
            certificate.sound_title,
            certificate.artist_name.as_deref().unwrap_or("-"),
            certificate.level
        );
        if let Some(number) = &certificate.certificate_number {
            println!("N° {number}");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the first page, then up to `pages - 1` more.
async fn fetch_pages<T, S>(list: &FilteredList<T, S>, pages: u32) -> Result<(), AppError>
where
    T: Identified + Clone + Send + Sync + 'static,
    S: ListSource<T>,
{
    list.reload().await?;
    for _ in 1..pages {
        if !list.show_load_more().await {
            break;
        }
        list.load_more().await?;
    }
    Ok(())
}

/// Drive a download while an indicatif bar follows the tracker's events.
async fn with_progress<K, F>(tracker: &DownloadTracker<K>, download: F) -> anyhow::Result<PathBuf>
where
    K: FileSink,
    F: Future<Output = Result<PathBuf, AppError>>,
{
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut events = tracker.subscribe();
    let watcher = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    DownloadEvent::Progress { progress, .. } => match progress.percent() {
                        Some(percent) => bar.set_position(percent as u64),
                        None => bar.set_message(format!("{} octets", progress.received())),
                    },
                    DownloadEvent::Started { target } => bar.set_message(target.to_string()),
                    _ => {}
                }
            }
        })
    };

    let result = download.await;
    watcher.abort();
    match result {
        Ok(path) => {
            bar.set_position(100);
            bar.finish_with_message("terminé");
            Ok(path)
        }
        Err(err) => {
            bar.abandon_with_message("échec");
            Err(err.into())
        }
    }
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let mime = match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => anyhow::bail!("unsupported image type: {}", path.display()),
    };
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(ImageUpload {
        filename,
        mime: mime.to_string(),
        bytes,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_field_errors(err: &AppError) {
    if let Some(errors) = err.field_errors() {
        for field in errors.fields() {
            for message in errors.get(field) {
                eprintln!("  {field}: {message}");
            }
        }
    }
}

/// Surface local validation errors before failing.
fn check(result: Result<(), AppError>) -> anyhow::Result<()> {
    result.map_err(|err| {
        print_field_errors(&err);
        err.into()
    })
}

/// A declined confirmation is not a failure.
fn cancellable(result: Result<(), AppError>) -> anyhow::Result<()> {
    match result {
        Err(AppError::Cancelled) => {
            eprintln!("Annulé");
            Ok(())
        }
        other => check(other),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
