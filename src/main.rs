// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Point Rewards command-line client.
//!
//! Drives the consumer catalog and the admin dashboard from a terminal.
//! Tables go to stdout; notifications go to stderr.

use anyhow::{bail, Context, Result};
use pico_args::Arguments;
use point_rewards_client::{
    config::{AppVariant, Config},
    error::AppError,
    models::{Address, Category, Prize},
    services::invite_link,
    session::{AuthState, Route, SignOutReason},
    time_utils::format_listing,
    views::{
        forms::{LoginForm, PrizeForm, PrizeUpdate, RegisterForm, UserUpdate},
        listing::{CategoryFilter, PrizeFilter, PrizeSortField, RedemptionFilter, StatusFilter, UserFilter},
        query::{Query, QueryKey},
        redemption::{can_redeem, ModalPhase, RedeemGate, RedemptionModal},
        upload::UploadReport,
        DashboardStats,
    },
    AppContext,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Point Rewards client

USAGE:
  point-rewards [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
  --server URL          API base URL  [default: $API_BASE_URL or http://localhost:5000/api]
  --admin               Use the admin session (implied by admin commands)
  -h, --help            Print help information

COMMANDS:
  login --phone P [--password X]
  logout
  register --nickname N --kuaishou-id K --phone P [--password X] [--inviter ID]
  me                    Refresh and show points and address
  address TEXT          Set the shipping address
  prizes [--category C] Browse the catalog (C: all, cash, voucher, gift)
  redeem PRIZE_ID       Redeem a prize
  history               Show your redemptions
  invite                Print your invite link

ADMIN COMMANDS:
  users [--search Q]
  user-edit ID [--nickname N] [--kuaishou-id K] [--phone P] [--points N] [--is-admin BOOL]
  admin-prizes [--search Q] [--category C] [--sort points|stock|status] [--desc]
  prize-add --name N --points N [--description D] [--image URL] [--category C] [--stock N]
  prize-edit ID [--name N] [--points N] [--description D] [--image URL] [--category C] [--stock N]
  redemptions [--search Q] [--status S]
  upload FILE [--all]   Import a transaction spreadsheet (.xlsx/.xls)
  upload-image FILE     Upload a prize image, print its URL
  template [DEST]       Download the import template
  dashboard             Summary counters and recent redemptions
";

const ADMIN_COMMANDS: &[&str] = &[
    "users",
    "user-edit",
    "admin-prizes",
    "prize-add",
    "prize-edit",
    "redemptions",
    "upload",
    "upload-image",
    "template",
    "dashboard",
];

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<AppError>() {
                Some(app) => app.notification(),
                None => format!("{:#}", e),
            };
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let server: Option<String> = pargs.opt_value_from_str("--server")?;
    let admin_flag = pargs.contains("--admin");
    let Some(command) = pargs.subcommand()? else {
        print!("{HELP}");
        return Ok(());
    };

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = server {
        config = config.with_base_url(&url);
    }
    if admin_flag || ADMIN_COMMANDS.contains(&command.as_str()) {
        config = config.with_variant(AppVariant::Admin)?;
    }

    let ctx = AppContext::init(config)?;
    let mut auth_events = ctx.session.subscribe();

    let result = dispatch(&ctx, &command, pargs).await;

    // A rejected token signs the session out; send the user to login once.
    if auth_events.has_changed().unwrap_or(false) {
        let state = *auth_events.borrow_and_update();
        let expired = matches!(
            state,
            AuthState::SignedOut {
                reason: SignOutReason::Expired
            }
        );
        if expired && state.route() == Route::Login {
            eprintln!("Please log in again: point-rewards login --phone <phone>");
        }
    }

    ctx.teardown();
    result
}

async fn dispatch(ctx: &AppContext, command: &str, mut pargs: Arguments) -> Result<()> {
    match command {
        "login" => login(ctx, &mut pargs).await?,
        "logout" => {
            ctx.auth.logout()?;
            eprintln!("Logged out");
        }
        "register" => register(ctx, &mut pargs).await?,
        "me" => me(ctx).await?,
        "address" => {
            let text: String = pargs.free_from_str().context("Missing address text")?;
            require_session(ctx)?;
            let user = ctx.auth.update_address(&Address::parse(&text)).await?;
            eprintln!("您的收货地址已更新");
            if let Some(a) = user.addresses.first() {
                println!("{}", a.display_line());
            }
        }
        "prizes" => prizes(ctx, &mut pargs).await?,
        "redeem" => {
            let prize_id: i64 = pargs.free_from_str().context("Missing prize id")?;
            redeem(ctx, prize_id).await?;
        }
        "history" => history(ctx).await?,
        "invite" => {
            let user_id = ctx.session.snapshot().map(|s| s.id);
            println!("{}", invite_link(&ctx.config.invite_base_url, user_id));
        }
        "users" => users(ctx, &mut pargs).await?,
        "user-edit" => user_edit(ctx, &mut pargs).await?,
        "admin-prizes" => admin_prizes(ctx, &mut pargs).await?,
        "prize-add" => prize_add(ctx, &mut pargs).await?,
        "prize-edit" => prize_edit(ctx, &mut pargs).await?,
        "redemptions" => redemptions(ctx, &mut pargs).await?,
        "upload" => upload(ctx, &mut pargs).await?,
        "upload-image" => {
            let path: PathBuf = pargs.free_from_str().context("Missing image path")?;
            require_session(ctx)?;
            let image = ctx.prizes.upload_image(&path).await?;
            eprintln!("图片上传成功");
            if let Some(preview) = ctx.prizes.image_url(Some(&image.url)) {
                eprintln!("预览: {}", preview);
            }
            println!("{}", image.url);
        }
        "template" => {
            let dest: Option<PathBuf> = pargs.opt_free_from_str()?;
            require_session(ctx)?;
            let path = ctx
                .transactions
                .download_template(&dest.unwrap_or_else(|| PathBuf::from(".")))
                .await?;
            println!("{}", path.display());
        }
        "dashboard" => dashboard(ctx).await?,
        other => bail!("Unknown command: {}\n\n{}", other, HELP),
    }

    let rest = pargs.finish();
    if !rest.is_empty() {
        tracing::warn!(?rest, "Ignored unrecognized arguments");
    }
    Ok(())
}

/// Route guard: commands other than login/register need a session.
fn require_session(ctx: &AppContext) -> Result<(), AppError> {
    if ctx.session.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthorized("请先登录".to_string()))
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}

async fn login(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let phone = match pargs.opt_value_from_str("--phone")? {
        Some(p) => p,
        None => prompt("Phone")?,
    };
    let password = match pargs.opt_value_from_str("--password")? {
        Some(p) => p,
        None => prompt("Password")?,
    };

    let user = ctx.auth.login(&LoginForm { phone, password }).await?;
    eprintln!("登录成功, 欢迎 {}", user.nickname);
    Ok(())
}

async fn register(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let nickname: String = pargs.value_from_str("--nickname")?;
    let kuaishou_id: String = pargs.value_from_str("--kuaishou-id")?;
    let phone: String = pargs.value_from_str("--phone")?;
    let inviter: Option<String> = pargs.opt_value_from_str("--inviter")?;
    let (password, confirm_password) = match pargs.opt_value_from_str::<_, String>("--password")? {
        Some(p) => (p.clone(), p),
        None => (prompt("Password")?, prompt("Confirm password")?),
    };

    let user = ctx
        .auth
        .register(&RegisterForm {
            nickname,
            kuaishou_id,
            phone,
            password,
            confirm_password,
            inviter,
        })
        .await?;
    eprintln!("注册成功, 欢迎 {}! 请立即登录。", user.nickname);
    Ok(())
}

async fn me(ctx: &AppContext) -> Result<()> {
    require_session(ctx)?;
    let info = ctx.auth.refresh_profile().await?;
    let snapshot = ctx.session.snapshot();

    if let Some(s) = &snapshot {
        println!("{} ({})", s.nickname, s.kuaishou_id);
    }
    println!("积分: {}", info.points.format_whole());
    let address = snapshot
        .as_ref()
        .and_then(|s| s.primary_address())
        .map(Address::display_line)
        .unwrap_or_else(|| "暂未设置收货地址".to_string());
    println!("收货地址: {}", address);
    Ok(())
}

async fn prizes(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let category: Option<String> = pargs.opt_value_from_str("--category")?;
    require_session(ctx)?;

    let mut catalog: Query<Vec<Prize>> = Query::new(&ctx.cache, QueryKey::Catalog);
    let prizes = catalog.load(move || ctx.prizes.list_catalog()).await?;
    let filter = CategoryFilter::parse(category.as_deref().unwrap_or("all"));
    let points = ctx.session.snapshot().map(|s| s.points).unwrap_or_default();

    for prize in filter.apply(prizes) {
        let marker = if can_redeem(points, prize) {
            "可兑换"
        } else if prize.stock == 0 {
            "库存不足"
        } else {
            "积分不足"
        };
        println!(
            "{:>5}  {:<24} {:>10} 积分  {:<8} 库存 {:>4}  {}",
            prize.id,
            prize.name,
            prize.points.format_whole(),
            prize.category.label(),
            prize.stock,
            marker
        );
    }
    Ok(())
}

async fn redeem(ctx: &AppContext, prize_id: i64) -> Result<()> {
    require_session(ctx)?;

    // Points and address must be current before the gate runs.
    ctx.auth.refresh_profile().await?;
    let prize = ctx
        .prizes
        .list_catalog()
        .await?
        .into_iter()
        .find(|p| p.id == prize_id)
        .with_context(|| format!("奖品不存在: {}", prize_id))?;
    let user = ctx
        .session
        .snapshot()
        .ok_or(AppError::SessionExpired)?;

    RedeemGate::check(&user, &prize).map_err(AppError::from)?;

    let mut modal = RedemptionModal::open(prize, user.points, ctx.config.redemption_failure);
    let shipping = user.primary_address().cloned();
    let outcome = modal
        .confirm(move |prize| async move {
            ctx.redemptions.redeem(prize.id, shipping.as_ref()).await?;
            ctx.auth.refresh_profile().await.map(|_| ())
        })
        .await;

    match modal.phase() {
        ModalPhase::Redeemed => {
            eprintln!("兑换成功! 奖品将在3-5个工作日内发放");
            if let Some(s) = ctx.session.snapshot() {
                println!("剩余积分: {}", s.points.format_whole());
            }
        }
        ModalPhase::Failed { message } => eprintln!("兑换失败: {}", message),
        ModalPhase::Confirming | ModalPhase::Redeeming => {}
    }
    modal.close();
    outcome?;
    Ok(())
}

async fn history(ctx: &AppContext) -> Result<()> {
    require_session(ctx)?;
    let mut query: Query<Vec<_>> = Query::new(&ctx.cache, QueryKey::History);
    let records = query.load(move || ctx.redemptions.history()).await?;
    if records.is_empty() {
        println!("暂无兑换记录");
    }
    for r in records {
        println!(
            "{}  {:<24} -{} 积分  {}",
            format_listing(r.created_at),
            r.prize_name,
            r.points_spent.format_whole(),
            r.status.label()
        );
    }
    Ok(())
}

async fn users(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let filter = UserFilter {
        search: pargs.opt_value_from_str("--search")?.unwrap_or_default(),
    };
    require_session(ctx)?;

    let mut query = Query::new(&ctx.cache, QueryKey::Users);
    let users = query.load(move || ctx.users.list()).await?;
    for u in filter.apply(users) {
        println!(
            "{:>5}  {:<16} {:<16} {:<12} {:>12}{}",
            u.id,
            u.nickname,
            u.kuaishou_id,
            u.phone,
            u.points.format_precise(),
            if u.is_admin { "  [admin]" } else { "" }
        );
    }
    Ok(())
}

async fn user_edit(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let update = UserUpdate {
        nickname: pargs.opt_value_from_str("--nickname")?,
        kuaishou_id: pargs.opt_value_from_str("--kuaishou-id")?,
        phone: pargs.opt_value_from_str("--phone")?,
        points: pargs.opt_value_from_str("--points")?,
        is_admin: pargs.opt_value_from_str("--is-admin")?,
    };
    let id: i64 = pargs.free_from_str().context("Missing user id")?;
    require_session(ctx)?;

    let user = ctx.users.update(id, &update).await?;
    eprintln!("用户信息更新成功");
    println!("{} {} 积分 {}", user.id, user.nickname, user.points.format_precise());
    Ok(())
}

fn parse_sort(name: &str) -> Result<PrizeSortField> {
    Ok(match name {
        "points" => PrizeSortField::Points,
        "stock" => PrizeSortField::Stock,
        "status" => PrizeSortField::Status,
        other => bail!("Unknown sort field: {}", other),
    })
}

async fn admin_prizes(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let mut filter = PrizeFilter {
        search: pargs.opt_value_from_str("--search")?.unwrap_or_default(),
        category: CategoryFilter::parse(
            &pargs
                .opt_value_from_str::<_, String>("--category")?
                .unwrap_or_default(),
        ),
        ..PrizeFilter::default()
    };
    if let Some(field) = pargs.opt_value_from_str::<_, String>("--sort")? {
        let field = parse_sort(&field)?;
        filter.sort.toggle(field);
        if pargs.contains("--desc") {
            filter.sort.toggle(field);
        }
    }
    require_session(ctx)?;

    let mut query = Query::new(&ctx.cache, QueryKey::Prizes);
    let prizes = query.load(move || ctx.prizes.list_admin()).await?;
    for p in filter.apply(prizes) {
        println!(
            "{:>5}  {:<24} {:>10}  {:<8} {:>5}  {}",
            p.id,
            p.name,
            p.points.format_precise(),
            p.category.label(),
            p.stock,
            p.stock_status().label()
        );
    }
    Ok(())
}

async fn prize_add(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let form = PrizeForm {
        name: pargs.value_from_str("--name")?,
        points: pargs.value_from_str("--points")?,
        description: pargs.opt_value_from_str("--description")?,
        image: pargs.opt_value_from_str("--image")?,
        category: match pargs.opt_value_from_str::<_, String>("--category")? {
            Some(c) => parse_category(&c)?,
            None => Category::Gift,
        },
        stock: pargs.opt_value_from_str("--stock")?.unwrap_or(10),
    };
    require_session(ctx)?;

    let prize = ctx.prizes.create(&form).await?;
    eprintln!("奖品创建成功");
    println!("{}", prize.id);
    Ok(())
}

async fn prize_edit(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let update = PrizeUpdate {
        name: pargs.opt_value_from_str("--name")?,
        description: pargs.opt_value_from_str("--description")?,
        image: pargs.opt_value_from_str("--image")?,
        points: pargs.opt_value_from_str("--points")?,
        category: pargs
            .opt_value_from_str::<_, String>("--category")?
            .map(|c| parse_category(&c))
            .transpose()?,
        stock: pargs.opt_value_from_str("--stock")?,
    };
    let id: i64 = pargs.free_from_str().context("Missing prize id")?;
    require_session(ctx)?;

    ctx.prizes.update(id, &update).await?;
    eprintln!("奖品信息更新成功");
    Ok(())
}

async fn redemptions(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let filter = RedemptionFilter {
        search: pargs.opt_value_from_str("--search")?.unwrap_or_default(),
        status: StatusFilter::parse(
            &pargs
                .opt_value_from_str::<_, String>("--status")?
                .unwrap_or_default(),
        ),
    };
    require_session(ctx)?;

    let mut query = Query::new(&ctx.cache, QueryKey::Redemptions);
    let records = query.load(move || ctx.redemptions.list_admin()).await?;
    for r in filter.apply(records) {
        println!(
            "{:>5}  {}  user {:<5} {:<24} {:>10}  {:<6} {}",
            r.id,
            format_listing(r.created_at),
            r.user_id.map(|id| id.to_string()).unwrap_or_default(),
            r.prize_name,
            r.points_spent.format_precise(),
            r.status.label(),
            r.shipping_address
                .as_ref()
                .map(Address::display_line)
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Prize categories are picked from a fixed list in the admin form.
fn parse_category(s: &str) -> Result<Category> {
    let category = Category::parse(s);
    if !Category::known().contains(&category) {
        let known = Category::known();
        let names: Vec<&str> = known.iter().map(|c| c.as_str()).collect();
        bail!("Unknown category {:?}, expected one of: {}", s, names.join(", "));
    }
    Ok(category)
}

async fn upload(ctx: &AppContext, pargs: &mut Arguments) -> Result<()> {
    let show_all = pargs.contains("--all");
    let path: PathBuf = pargs.free_from_str().context("Missing spreadsheet path")?;
    require_session(ctx)?;

    let mut report = UploadReport::new(ctx.transactions.upload(&path).await?);
    if show_all {
        report.expand();
    }

    let result = report.result();
    println!("处理总数: {}", result.total_processed);
    println!("更新成功: {}", result.updated_count);
    println!("未找到用户: {}", result.not_found_count);
    println!("成功率: {}%", report.success_rate());
    for e in report.visible_errors() {
        println!("  第{}行  {}  {}", e.row, e.kuaishou_id, e.reason);
    }
    if !report.is_expanded() && report.hidden_count() > 0 {
        println!("  ... 还有 {} 条错误 (--all 显示全部)", report.hidden_count());
    }
    Ok(())
}

async fn dashboard(ctx: &AppContext) -> Result<()> {
    require_session(ctx)?;
    let stats = DashboardStats::load(&ctx.users, &ctx.prizes, &ctx.redemptions).await?;

    println!("总用户数: {}", stats.users.total);
    println!("奖品总数: {}", stats.prizes.total);
    println!("兑换记录: {}", stats.redemptions.total);
    println!("消耗积分: {}", stats.redemptions.points_spent.format_precise());
    println!("库存警告: {}", stats.prizes.low_stock);
    println!("最近兑换:");
    for r in &stats.recent {
        println!(
            "  {}  {:<24} {:>10}  {}",
            format_listing(r.created_at),
            r.prize_name,
            r.points_spent.format_precise(),
            r.status.label()
        );
    }
    Ok(())
}

/// Human-readable logs on stderr, or JSON with `LOG_FORMAT=json`.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("point_rewards_client=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init();
    }
}
