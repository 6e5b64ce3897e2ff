use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the tool set over newline-delimited JSON-RPC on stdio.
    Serve,

    /// Print the registered tool schemas.
    Tools,

    /// Invoke one tool directly and print its markdown result.
    Call {
        /// Tool name, e.g. get_hk_stock_info
        tool: String,

        /// JSON object with the tool parameters
        #[arg(long)]
        params: Option<String>,
    },
}
