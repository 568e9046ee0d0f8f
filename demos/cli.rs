use std::{path::PathBuf, str::FromStr};

use skillcircuit_rs::{guard::RouteDecision, session::FileStore, Client};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "skillcircuit",
    about = "Sign in to SkillCircuit from the terminal."
)]
struct Opt {
    /// Where the session file lives.
    #[structopt(
        long,
        default_value = ".skillcircuit-session.json",
        parse(from_os_str)
    )]
    session_file: PathBuf,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Sign in with an existing account
    Login {
        email: String,
        #[structopt(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[structopt(short, long)]
        password: String,
    },
    /// Sign out and drop the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check whether a view would render for the current session
    Guard { view: View },
}

#[derive(Debug)]
enum View {
    Dashboard,
    Roadmaps,
    Interview,
    Resume,
    Jobs,
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(View::Dashboard),
            "roadmaps" => Ok(View::Roadmaps),
            "interview" => Ok(View::Interview),
            "resume" => Ok(View::Resume),
            "jobs" => Ok(View::Jobs),
            _ => Err(format!(
                "unknown view: {} (expected dashboard, roadmaps, interview, resume or jobs)",
                s
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opt = Opt::from_args();

    let client = Client::builder()
        .with_store(FileStore::new(opt.session_file))
        .build()?;
    let session = client.session();
    session.restore()?;

    match opt.cmd {
        Cmd::Login { email, password } => {
            let user = session.login(email, password).await?;
            println!("signed in as {} <{}>", user.name, user.email);
        }
        Cmd::Register {
            name,
            email,
            password,
        } => {
            let user = session.register(name, email, password).await?;
            println!("registered {} <{}>", user.name, user.email);
        }
        Cmd::Logout => {
            session.logout()?;
            println!("signed out");
        }
        Cmd::Whoami => match session.current_user()? {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                if let Some(target_role) = user.target_role {
                    println!("target role: {}", target_role);
                }
                if let Some(experience_level) = user.experience_level {
                    println!("experience: {}", experience_level);
                }
            }
            None => println!("not signed in"),
        },
        Cmd::Guard { view } => match session.guard(view)? {
            RouteDecision::Render(view) => println!("{:?} renders", view),
            RouteDecision::RedirectToLogin => println!("redirect to login"),
            RouteDecision::Pending => println!("session still restoring"),
        },
    }

    Ok(())
}
